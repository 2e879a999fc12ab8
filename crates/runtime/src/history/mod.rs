//! Snapshot-based undo/redo.
//!
//! One [`Snapshot`] is captured per completed turn (plus one for the initial
//! state). [`SnapshotHistory`] keeps them in an append-only list with a
//! cursor; capturing while the cursor is behind the newest snapshot discards
//! the abandoned branch first.

mod persist;
mod snapshot;

pub use persist::{PersistedSnapshot, load_snapshot, persist_snapshot, snapshot_key};
pub use snapshot::{Snapshot, SnapshotHistory};

use arena_core::{ErrorSeverity, GameError};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("no snapshot captured yet")]
    Empty,

    #[error("cannot move {requested} step(s); only {available} available")]
    OutOfRange { requested: usize, available: usize },

    #[error("snapshot '{key}' is corrupted: digest {actual} does not match {expected}")]
    Corrupted {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError for HistoryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Empty | Self::OutOfRange { .. } => ErrorSeverity::Validation,
            Self::Corrupted { .. } => ErrorSeverity::Fatal,
            Self::Encode(_) => ErrorSeverity::Internal,
            Self::Store(_) => ErrorSeverity::Recoverable,
        }
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;
