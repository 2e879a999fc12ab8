use arena_core::{Event, Roster};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{HistoryError, Result};
use crate::abilities::AbilityInstance;
use crate::engine::EngineCounters;

/// Deep copy of game truth after a turn.
///
/// Ability instances are included in full: cooldowns, uses and every scoped
/// variable are as much part of the game as HP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u32,
    pub roster: Roster,
    pub abilities: Vec<AbilityInstance>,
    pub counters: EngineCounters,
    /// Events dispatched since the previous snapshot.
    pub events: Vec<Event>,
}

impl Snapshot {
    /// SHA-256 over the canonical JSON encoding, hex encoded.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Append-only snapshot list with an undo/redo cursor.
#[derive(Debug, Default)]
pub struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot after dropping everything beyond the cursor.
    pub fn capture(&mut self, snapshot: Snapshot) -> &Snapshot {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        if keep < self.snapshots.len() {
            debug!(
                target: "arena::history",
                discarded = self.snapshots.len() - keep,
                "discarding abandoned branch"
            );
            self.snapshots.truncate(keep);
        }

        info!(
            target: "arena::history",
            turn = snapshot.turn,
            events = snapshot.events.len(),
            "snapshot captured"
        );
        self.snapshots.push(snapshot);
        let index = self.snapshots.len() - 1;
        self.cursor = Some(index);
        &self.snapshots[index]
    }

    /// Moves the cursor `steps` snapshots back and returns the snapshot there.
    pub fn rollback(&mut self, steps: usize) -> Result<&Snapshot> {
        let cursor = self.cursor.ok_or(HistoryError::Empty)?;
        if steps > cursor {
            return Err(HistoryError::OutOfRange {
                requested: steps,
                available: cursor,
            });
        }
        self.move_to(cursor - steps)
    }

    /// Moves the cursor `steps` snapshots forward again.
    pub fn redo(&mut self, steps: usize) -> Result<&Snapshot> {
        let cursor = self.cursor.ok_or(HistoryError::Empty)?;
        let available = self.snapshots.len() - 1 - cursor;
        if steps > available {
            return Err(HistoryError::OutOfRange {
                requested: steps,
                available,
            });
        }
        self.move_to(cursor + steps)
    }

    fn move_to(&mut self, index: usize) -> Result<&Snapshot> {
        self.cursor = Some(index);
        let snapshot = &self.snapshots[index];
        info!(target: "arena::history", turn = snapshot.turn, "cursor moved");
        Ok(snapshot)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.map(|cursor| &self.snapshots[cursor])
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor + 1 < self.snapshots.len())
    }

    /// Full event history as of the cursor: the concatenated slices of every
    /// snapshot up to and including it.
    pub fn events_through_cursor(&self) -> Vec<Event> {
        let end = self.cursor.map_or(0, |cursor| cursor + 1);
        self.snapshots[..end]
            .iter()
            .flat_map(|snapshot| snapshot.events.iter().cloned())
            .collect()
    }
}
