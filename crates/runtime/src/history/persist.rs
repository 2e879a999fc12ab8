use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{HistoryError, Result, Snapshot};
use crate::store::DataStore;

/// Envelope written to the data store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub session_id: String,
    pub digest: String,
    pub captured_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

pub fn snapshot_key(session_id: &str, turn: u32) -> String {
    format!("snapshot/{session_id}/{turn}")
}

pub async fn persist_snapshot(
    store: &dyn DataStore,
    session_id: &str,
    snapshot: &Snapshot,
) -> Result<PersistedSnapshot> {
    let envelope = PersistedSnapshot {
        session_id: session_id.to_string(),
        digest: snapshot.digest()?,
        captured_at: Utc::now(),
        snapshot: snapshot.clone(),
    };
    let key = snapshot_key(session_id, snapshot.turn);
    store.put(&key, serde_json::to_value(&envelope)?).await?;
    info!(target: "arena::history", key = %key, digest = %envelope.digest, "snapshot persisted");
    Ok(envelope)
}

/// Loads and verifies a persisted snapshot. A digest mismatch is fatal.
pub async fn load_snapshot(
    store: &dyn DataStore,
    session_id: &str,
    turn: u32,
) -> Result<Option<PersistedSnapshot>> {
    let key = snapshot_key(session_id, turn);
    let Some(value) = store.get(&key).await? else {
        return Ok(None);
    };
    let envelope: PersistedSnapshot = serde_json::from_value(value)?;
    let actual = envelope.snapshot.digest()?;
    if actual != envelope.digest {
        error!(target: "arena::history", key = %key, "snapshot digest mismatch");
        return Err(HistoryError::Corrupted {
            key,
            expected: envelope.digest,
            actual,
        });
    }
    Ok(Some(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineCounters;
    use crate::store::InMemoryDataStore;
    use arena_core::{GameConfig, Roster};

    fn snapshot() -> Snapshot {
        Snapshot {
            turn: 2,
            roster: Roster::from_names(["a", "b"], &GameConfig::default()).unwrap(),
            abilities: Vec::new(),
            counters: EngineCounters::default(),
            events: Vec::new(),
        }
    }

    #[tokio::test]
    async fn persisted_snapshots_verify_on_load() {
        let store = InMemoryDataStore::new();
        let written = persist_snapshot(&store, "duel", &snapshot()).await.unwrap();

        let loaded = load_snapshot(&store, "duel", 2).await.unwrap().unwrap();
        assert_eq!(loaded, written);
        assert!(load_snapshot(&store, "duel", 3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tampered_snapshots_are_corrupted() {
        let store = InMemoryDataStore::new();
        persist_snapshot(&store, "duel", &snapshot()).await.unwrap();

        let key = snapshot_key("duel", 2);
        let mut value = store.get(&key).await.unwrap().unwrap();
        value["snapshot"]["turn"] = serde_json::json!(9);
        store.put(&key, value).await.unwrap();

        let err = load_snapshot(&store, "duel", 2).await.unwrap_err();
        assert!(matches!(err, HistoryError::Corrupted { .. }));
    }
}
