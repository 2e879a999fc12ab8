//! Ability-hook runtime.
//!
//! An [`Ability`] is static behavior looked up by id in the
//! [`AbilityRegistry`]; binding it to a player creates an
//! [`AbilityInstance`] holding the mutable side (cooldown, uses, error count,
//! scoped variables). The [`AbilityRuntime`] owns every instance and:
//!
//! - gates player-triggered uses through [`Ability::check_ready`] before any
//!   state is touched
//! - dispatches passive hooks across all bound abilities in descending
//!   priority order, ties broken by bind order
//! - isolates faults: an `Err`, a panic, or an overrun of the hook time
//!   budget counts against the instance, which is disabled once its error
//!   count exceeds the configured threshold
//!
//! # Variable scopes
//!
//! | Scope | Lifetime |
//! |-------|----------|
//! | [`Scope::Permanent`] | across sessions, persisted through the data store |
//! | [`Scope::Session`] | one game, memory only |
//! | [`Scope::Turn`] | purged after the turn's cleanup |

pub mod builtin;
mod context;
mod instance;
mod registry;
mod runtime;
mod scope;

pub use context::{AbilityContext, AbilityEnv};
pub use instance::{AbilityInstance, NotReady};
pub use registry::AbilityRegistry;
pub use runtime::{AbilityFault, AbilityRuntime, BindError};
pub use scope::{Scope, ScopedVars, VarMap};

use arena_core::{ErrorSeverity, Event, EventKind, GameError, PlayerId, RosterError, StatusError};

/// Errors raised by ability code. The runtime treats them as faults.
#[derive(Debug, thiserror::Error)]
pub enum AbilityError {
    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("{0}")]
    Script(String),
}

impl GameError for AbilityError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }
}

/// Inputs for a player-triggered use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityParams {
    pub actor: PlayerId,
    pub target: Option<PlayerId>,
    pub turn: u32,
}

/// Structured result of [`Ability::execute`].
///
/// `damage` and `death` apply to `target` when set, otherwise to the declared
/// target; `heal` applies to `target` when set, otherwise to the actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbilityOutcome {
    pub success: bool,
    pub message: String,
    pub damage: Option<i32>,
    pub heal: Option<i32>,
    pub death: bool,
    pub target: Option<PlayerId>,
}

impl AbilityOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_heal(mut self, heal: i32) -> Self {
        self.heal = Some(heal);
        self
    }

    pub fn with_target(mut self, target: PlayerId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn lethal(mut self) -> Self {
        self.death = true;
        self
    }
}

/// Behavior of one ability, shared by every player it is bound to.
///
/// Implementations hold no per-player state; anything an ability must
/// remember goes into the instance's scoped variables via [`AbilityContext`].
pub trait Ability: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// Higher runs first when several abilities hook the same event.
    fn priority(&self) -> i32 {
        0
    }

    fn max_cooldown(&self) -> u32 {
        0
    }

    /// `None` means unlimited.
    fn max_uses(&self) -> Option<u32> {
        None
    }

    /// Event kinds [`Ability::on_event`] wants to see.
    fn hooks(&self) -> &'static [EventKind] {
        &[]
    }

    /// Gate checked before `execute`. Must not mutate anything.
    fn check_ready(&self, instance: &AbilityInstance) -> Result<(), NotReady> {
        instance.readiness()
    }

    /// Player-triggered use. Business-rule failures are returned as
    /// [`AbilityOutcome::failure`], not as errors.
    fn execute(
        &self,
        _ctx: &mut AbilityContext<'_>,
        _params: &AbilityParams,
    ) -> Result<AbilityOutcome, AbilityError> {
        Ok(AbilityOutcome::failure(format!(
            "{} has no active use",
            self.name()
        )))
    }

    /// Passive hook for the kinds listed in [`Ability::hooks`].
    fn on_event(&self, _event: &mut Event, _ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        Ok(())
    }
}
