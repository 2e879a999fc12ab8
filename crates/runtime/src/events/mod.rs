//! Event bus for combat events.
//!
//! The event types themselves live in `arena-core`; this module provides the
//! dispatch machinery the turn engine and ability runtime plug into.

mod bus;

pub use bus::{BusError, EventBus, EventQueue, Handler, HandlerError, SubscriptionId};
