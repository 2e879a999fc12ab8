//! Player roster and per-player combat state.
//!
//! The [`Roster`] is the arena every subsystem indexes into with a
//! [`PlayerId`]. Only the snapshot history ever clones it.

mod player;
mod roster;

pub use player::{Player, PlayerId, PlayerStatus, TurnFlags};
pub use roster::Roster;

use crate::error::{ErrorSeverity, GameError};

/// Errors raised while reading or mutating the roster.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RosterError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is not dead")]
    NotDead(PlayerId),

    #[error("roster holds {count} players, maximum is {max}")]
    TooManyPlayers { count: usize, max: usize },

    #[error("player ids must be dense: expected {expected}, found {found}")]
    NonDenseId { expected: PlayerId, found: PlayerId },

    #[error("defense gauge of {player} would drop below zero")]
    GaugeUnderflow { player: PlayerId },

    #[error("defense gauge of {player} is {gauge}, above maximum {max}")]
    GaugeOverflow {
        player: PlayerId,
        gauge: u32,
        max: u32,
    },

    #[error("status effect '{effect}' on {player} exceeds its maximum stacks")]
    StacksOverflow { player: PlayerId, effect: String },
}

impl GameError for RosterError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownPlayer(_) | Self::NotDead(_) => ErrorSeverity::Validation,
            Self::TooManyPlayers { .. } | Self::NonDenseId { .. } => ErrorSeverity::Validation,
            Self::GaugeUnderflow { .. }
            | Self::GaugeOverflow { .. }
            | Self::StacksOverflow { .. } => ErrorSeverity::Fatal,
        }
    }
}
