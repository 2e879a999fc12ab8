//! Game session orchestration.
//!
//! A [`GameSession`] owns one [`TurnEngine`] plus the collaborators around
//! it: the snapshot history used for rollback, the [`DataStore`] holding
//! permanent ability variables and persisted snapshots, and the
//! [`RecordSink`] that receives finished turns. Sessions are built with
//! [`GameSessionBuilder`].

use std::sync::Arc;
use std::time::Duration;

use arena_core::{Action, GameConfig, PlayerId, Roster, StatusEffectEngine};
use tracing::{debug, info};

use crate::abilities::{AbilityRegistry, AbilityRuntime, VarMap};
use crate::api::{GameSummary, NullRecords, RecordSink, Result};
use crate::engine::{TurnEngine, TurnResult};
use crate::history::{HistoryError, Snapshot, SnapshotHistory, persist_snapshot};
use crate::store::{DataStore, InMemoryDataStore};

/// Session configuration shared by the engine and its collaborators.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub game: GameConfig,
    pub seed: u64,
    pub session_id: String,
    /// Faults an ability instance may accumulate before it is disabled.
    pub ability_error_threshold: u32,
    /// Wall-clock budget for one ability hook; `None` disables the check.
    pub hook_time_budget: Option<Duration>,
    /// Also write every captured snapshot to the data store.
    pub persist_snapshots: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            seed: 0,
            session_id: "default".to_string(),
            ability_error_threshold: AbilityRuntime::DEFAULT_ERROR_THRESHOLD,
            hook_time_budget: None,
            persist_snapshots: false,
        }
    }
}

/// Builder for [`GameSession`].
pub struct GameSessionBuilder {
    config: SessionConfig,
    roster: Roster,
    registry: AbilityRegistry,
    bindings: Vec<(PlayerId, String)>,
    store: Option<Arc<dyn DataStore>>,
    records: Option<Arc<dyn RecordSink>>,
}

impl GameSessionBuilder {
    pub fn new(roster: Roster) -> Self {
        Self {
            config: SessionConfig::default(),
            roster,
            registry: AbilityRegistry::builtin(),
            bindings: Vec::new(),
            store: None,
            records: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.config.session_id = session_id.into();
        self
    }

    /// Replaces the built-in ability registry.
    pub fn registry(mut self, registry: AbilityRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Binds `ability_id` to `owner` when the session is built.
    pub fn bind(mut self, owner: PlayerId, ability_id: impl Into<String>) -> Self {
        self.bindings.push((owner, ability_id.into()));
        self
    }

    pub fn store(mut self, store: Arc<dyn DataStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn records(mut self, records: Arc<dyn RecordSink>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn build(self) -> Result<GameSession> {
        let config = self.config;
        let status = StatusEffectEngine::builtin(config.game.clone());
        let abilities = AbilityRuntime::new(self.registry)
            .with_error_threshold(config.ability_error_threshold)
            .with_hook_time_budget(config.hook_time_budget);
        let mut engine = TurnEngine::with_parts(
            config.game.clone(),
            self.roster,
            config.seed,
            status,
            abilities,
        );
        for (owner, ability_id) in &self.bindings {
            engine.bind_ability(*owner, ability_id)?;
        }

        Ok(GameSession {
            engine,
            history: SnapshotHistory::new(),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryDataStore::new())),
            records: self.records.unwrap_or_else(|| Arc::new(NullRecords)),
            config,
        })
    }
}

/// One game from `start` to `finish`.
pub struct GameSession {
    engine: TurnEngine,
    history: SnapshotHistory,
    store: Arc<dyn DataStore>,
    records: Arc<dyn RecordSink>,
    config: SessionConfig,
}

impl GameSession {
    pub fn builder(roster: Roster) -> GameSessionBuilder {
        GameSessionBuilder::new(roster)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    /// Mutable engine access, for subscribing observers or setup between turns.
    pub fn engine_mut(&mut self) -> &mut TurnEngine {
        &mut self.engine
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Loads permanent ability variables, emits `GameStart` and captures the
    /// turn-0 snapshot. Calling it again is a no-op.
    pub async fn start(&mut self) -> Result<Vec<String>> {
        if self.engine.is_started() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = self
            .engine
            .abilities()
            .instances()
            .iter()
            .map(|instance| instance.permanent_key())
            .collect();
        for key in keys {
            if let Some(value) = self.store.get(&key).await? {
                let vars: VarMap = serde_json::from_value(value)?;
                debug!(target: "arena::session", key = %key, vars = vars.len(), "permanent vars loaded");
                self.engine.abilities_mut().load_permanent(&key, vars);
            }
        }

        let lines = self.engine.start_game()?;
        let snapshot = self.engine.snapshot(self.engine.history().to_vec());
        self.capture(snapshot).await?;
        info!(
            target: "arena::session",
            session = %self.config.session_id,
            players = self.engine.roster().len(),
            "session started"
        );
        Ok(lines)
    }

    /// Resolves one turn, persists changed permanent variables and captures a
    /// snapshot. Starts the game first if needed.
    pub async fn play_turn(&mut self, actions: &[Action]) -> Result<TurnResult> {
        let mut logs = self.start().await?;
        let mark = self.engine.history_len();

        let mut result = self.engine.process_turn(actions)?;
        self.persist_vars().await?;
        let snapshot = self
            .engine
            .snapshot(self.engine.history_since(mark).to_vec());
        self.capture(snapshot).await?;
        self.records
            .record_turn(&self.config.session_id, &result)
            .await?;

        logs.append(&mut result.logs);
        result.logs = logs;
        Ok(result)
    }

    /// Steps back `steps` snapshots and restores the engine to it.
    pub fn rollback(&mut self, steps: usize) -> Result<u32> {
        self.history.rollback(steps)?;
        self.restore_current()
    }

    /// Steps forward again after a rollback.
    pub fn redo(&mut self, steps: usize) -> Result<u32> {
        self.history.redo(steps)?;
        self.restore_current()
    }

    /// Restores the snapshot at the cursor, clearing an aborted turn.
    pub fn recover(&mut self) -> Result<u32> {
        self.restore_current()
    }

    /// Emits `GameEnd`, persists permanent variables and records the summary.
    pub async fn finish(&mut self) -> Result<GameSummary> {
        self.start().await?;
        let (winner, logs) = self.engine.end_game()?;
        self.persist_vars().await?;

        let roster = self.engine.roster();
        let summary = GameSummary {
            session_id: self.config.session_id.clone(),
            turns: self.engine.turn(),
            winner,
            winner_name: winner.map(|id| roster.name_of(id)),
            players: roster.players().to_vec(),
            logs,
        };
        self.records.record_game_end(&summary).await?;
        info!(
            target: "arena::session",
            session = %summary.session_id,
            turns = summary.turns,
            winner = ?summary.winner_name,
            "session finished"
        );
        Ok(summary)
    }

    fn restore_current(&mut self) -> Result<u32> {
        let events = self.history.events_through_cursor();
        let snapshot = self.history.current().ok_or(HistoryError::Empty)?;
        self.engine.restore(snapshot, events);
        Ok(snapshot.turn)
    }

    async fn capture(&mut self, snapshot: Snapshot) -> Result<()> {
        let snapshot = self.history.capture(snapshot);
        if self.config.persist_snapshots {
            persist_snapshot(self.store.as_ref(), &self.config.session_id, snapshot).await?;
        }
        Ok(())
    }

    async fn persist_vars(&mut self) -> Result<()> {
        for (key, vars) in self.engine.abilities().pending_permanent() {
            self.store.put(&key, serde_json::to_value(&vars)?).await?;
            debug!(target: "arena::session", key = %key, "permanent vars stored");
            self.engine.abilities_mut().mark_persisted(key, vars);
        }
        Ok(())
    }
}
