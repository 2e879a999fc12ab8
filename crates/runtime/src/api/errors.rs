//! Unified error type surfaced by the runtime API.
//!
//! Wraps failures from the roster, the status engine, the event bus, snapshot
//! history and the data store so callers can bubble them up with `?` and
//! still classify them by [`ErrorSeverity`].
use arena_core::{ErrorSeverity, GameError, RosterError, StatusError};
use thiserror::Error;

use crate::abilities::BindError;
use crate::engine::TurnPhase;
use crate::events::BusError;
use crate::history::HistoryError;
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A previous turn failed part way; restore a snapshot before continuing.
    #[error("turn aborted during {phase}; restore a snapshot to continue")]
    Aborted { phase: TurnPhase },

    #[error("game is already over")]
    GameOver,

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Status(#[from] StatusError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode game state")]
    Encode(#[from] serde_json::Error),
}

impl EngineError {
    pub fn is_fatal(&self) -> bool {
        self.severity().is_fatal()
    }
}

impl GameError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Aborted { .. } => ErrorSeverity::Internal,
            Self::GameOver | Self::Bind(_) => ErrorSeverity::Validation,
            Self::Bus(_) => ErrorSeverity::Fatal,
            Self::Roster(err) => err.severity(),
            Self::Status(err) => err.severity(),
            Self::History(err) => err.severity(),
            Self::Store(_) => ErrorSeverity::Recoverable,
            Self::Encode(_) => ErrorSeverity::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use arena_core::PlayerId;

    use super::*;

    #[test]
    fn severity_follows_the_wrapped_error() {
        let err = EngineError::from(RosterError::UnknownPlayer(PlayerId(9)));
        assert_eq!(err.severity(), RosterError::UnknownPlayer(PlayerId(9)).severity());

        assert!(!EngineError::GameOver.is_fatal());
        assert_eq!(
            EngineError::Aborted {
                phase: TurnPhase::DeathZoneCheck
            }
            .severity(),
            ErrorSeverity::Internal
        );
    }

    #[test]
    fn aborted_message_names_the_phase() {
        let err = EngineError::Aborted {
            phase: TurnPhase::StatusEffectTurnEnd,
        };
        assert!(err.to_string().contains("StatusEffectTurnEnd"));
    }
}
