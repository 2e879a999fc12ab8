//! Deterministic combat rules and data types for the arena resolver.
//!
//! `arena-core` defines the roster, declarations, the closed event union and
//! the stacking status-effect engine. It performs no I/O and holds no global
//! state; the runtime crate wires these pieces into a turn engine.
pub mod action;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod state;
pub mod status;

pub use action::{Action, ActionKind};
pub use combat::{evade_chance, roll_succeeds};
pub use config::GameConfig;
pub use env::{PcgRng, RngOracle, compute_seed};
pub use error::{ErrorSeverity, GameError};
pub use event::{AttackIntent, DeathCause, Event, EventKind, EventPayload};
pub use state::{Player, PlayerId, PlayerStatus, Roster, RosterError, TurnFlags};
pub use status::{
    EffectBehavior, EffectCatalog, EffectDef, EffectKind, EffectTick, EffectTickReport,
    StatusChange, StatusEffect, StatusEffectEngine, StatusEffects, StatusError, StatusPass,
    effect_ids,
};
