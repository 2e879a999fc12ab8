//! Sinks for finished turns and games.
//!
//! A session hands every [`TurnResult`] and the final [`GameSummary`] to a
//! [`RecordSink`]. Sinks are observers only; they never feed back into the
//! engine.
use std::sync::Arc;

use arena_core::{Player, PlayerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::errors::Result;
use crate::engine::TurnResult;

/// Final record of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub session_id: String,
    pub turns: u32,
    pub winner: Option<PlayerId>,
    pub winner_name: Option<String>,
    pub players: Vec<Player>,
    pub logs: Vec<String>,
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn record_turn(&self, session_id: &str, result: &TurnResult) -> Result<()>;

    async fn record_game_end(&self, summary: &GameSummary) -> Result<()>;
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRecords;

#[async_trait]
impl RecordSink for NullRecords {
    async fn record_turn(&self, _session_id: &str, _result: &TurnResult) -> Result<()> {
        Ok(())
    }

    async fn record_game_end(&self, _summary: &GameSummary) -> Result<()> {
        Ok(())
    }
}

/// Keeps records in memory. Clones share the same buffers.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecords {
    turns: Arc<Mutex<Vec<(String, TurnResult)>>>,
    games: Arc<Mutex<Vec<GameSummary>>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn turns(&self) -> Vec<(String, TurnResult)> {
        self.turns.lock().await.clone()
    }

    pub async fn games(&self) -> Vec<GameSummary> {
        self.games.lock().await.clone()
    }
}

#[async_trait]
impl RecordSink for InMemoryRecords {
    async fn record_turn(&self, session_id: &str, result: &TurnResult) -> Result<()> {
        self.turns
            .lock()
            .await
            .push((session_id.to_string(), result.clone()));
        Ok(())
    }

    async fn record_game_end(&self, summary: &GameSummary) -> Result<()> {
        self.games.lock().await.push(summary.clone());
        Ok(())
    }
}
