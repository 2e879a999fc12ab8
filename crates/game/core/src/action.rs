//! Player declarations for one turn.

use std::fmt;

use crate::state::PlayerId;

/// What a player declared for the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Attack,
    Defend,
    Evade,
    Ability,
    Pass,
}

impl ActionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attack => "attack",
            Self::Defend => "defend",
            Self::Evade => "evade",
            Self::Ability => "ability",
            Self::Pass => "pass",
        }
    }

    /// Only attacks must name a target; abilities may be untargeted.
    pub const fn requires_target(&self) -> bool {
        matches!(self, Self::Attack)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declaration. Ephemeral: built by the caller, consumed by a single turn.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub actor: PlayerId,
    pub target: Option<PlayerId>,
    pub kind: ActionKind,
    /// Ability to use; `None` uses the actor's bound ability.
    pub ability_id: Option<String>,
}

impl Action {
    pub fn attack(actor: PlayerId, target: PlayerId) -> Self {
        Self {
            actor,
            target: Some(target),
            kind: ActionKind::Attack,
            ability_id: None,
        }
    }

    pub fn defend(actor: PlayerId) -> Self {
        Self::untargeted(actor, ActionKind::Defend)
    }

    pub fn evade(actor: PlayerId) -> Self {
        Self::untargeted(actor, ActionKind::Evade)
    }

    pub fn pass(actor: PlayerId) -> Self {
        Self::untargeted(actor, ActionKind::Pass)
    }

    pub fn ability(actor: PlayerId, target: Option<PlayerId>) -> Self {
        Self {
            actor,
            target,
            kind: ActionKind::Ability,
            ability_id: None,
        }
    }

    pub fn with_ability_id(mut self, ability_id: impl Into<String>) -> Self {
        self.ability_id = Some(ability_id.into());
        self
    }

    fn untargeted(actor: PlayerId, kind: ActionKind) -> Self {
        Self {
            actor,
            target: None,
            kind,
            ability_id: None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "{} {} -> {}", self.actor, self.kind, target),
            None => write!(f, "{} {}", self.actor, self.kind),
        }
    }
}
