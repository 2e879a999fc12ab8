//! Turn engine and collaborators for the arena combat resolver.
//!
//! This crate wires the rules in `arena-core` into a running game: an
//! ordered event bus, the ability-hook runtime, per-turn resolution,
//! snapshot history and pluggable storage. Consumers embed [`GameSession`]
//! to drive turns, or use [`TurnEngine`] directly when they manage history
//! and persistence themselves.
//!
//! Modules are organized by responsibility:
//! - [`engine`] resolves turns phase by phase
//! - [`events`] provides the synchronous, ordered, cancellable event bus
//! - [`abilities`] hosts the ability registry, instances and fault isolation
//! - [`history`] captures snapshots for rollback and redo
//! - [`store`] provides the key/JSON data store behind permanent variables
//! - [`session`] ties the above into a builder-based API
//! - [`api`] exposes error and record types downstream clients interact with
pub mod abilities;
pub mod api;
pub mod engine;
pub mod events;
pub mod history;
pub mod session;
pub mod store;

pub use abilities::{
    Ability, AbilityContext, AbilityError, AbilityInstance, AbilityOutcome, AbilityParams,
    AbilityRegistry, AbilityRuntime, BindError, NotReady, Scope,
};
pub use api::{EngineError, GameSummary, InMemoryRecords, NullRecords, RecordSink, Result};
pub use engine::{EngineContext, TurnEngine, TurnLog, TurnPhase, TurnResult};
pub use events::{BusError, EventBus, EventQueue, HandlerError, SubscriptionId};
pub use history::{HistoryError, PersistedSnapshot, Snapshot, SnapshotHistory};
pub use session::{GameSession, GameSessionBuilder, SessionConfig};
pub use store::{DataStore, FileDataStore, InMemoryDataStore, StoreError};
