//! Turn engine.
//!
//! [`TurnEngine`] owns the one authoritative [`EngineContext`] of a game and
//! the [`EventBus`] that dispatches into it. Every subsystem works on the
//! context by reference; nothing is global.
//!
//! The ability runtime is subscribed to every event kind before any external
//! subscriber, so ability hooks see each event first and external observers
//! see the result.

mod counters;
mod log;
mod phase;
mod resolve;
mod result;

pub use counters::{EngineCounters, FocusStreak};
pub use log::TurnLog;
pub use phase::TurnPhase;
pub use result::TurnResult;

use arena_core::{
    Event, EventKind, EventPayload, GameConfig, PlayerId, Roster, StatusChange,
    StatusEffectEngine,
};
use strum::IntoEnumIterator;
use tracing::{info, trace};

use crate::abilities::{AbilityEnv, AbilityRegistry, AbilityRuntime, BindError};
use crate::api::{EngineError, Result};
use crate::events::{EventBus, EventQueue, HandlerError, SubscriptionId};
use crate::history::Snapshot;

/// Everything one running game owns.
#[derive(Debug)]
pub struct EngineContext {
    pub config: GameConfig,
    pub seed: u64,
    pub roster: Roster,
    pub status: StatusEffectEngine,
    pub abilities: AbilityRuntime,
    pub counters: EngineCounters,
    pub log: TurnLog,
}

impl EngineContext {
    /// Splits off the ability runtime from the state it operates on.
    pub fn split(&mut self) -> (&mut AbilityRuntime, AbilityEnv<'_>) {
        let Self {
            config,
            roster,
            status,
            abilities,
            counters,
            log,
            ..
        } = self;
        let env = AbilityEnv {
            roster,
            status,
            log,
            config,
            turn: counters.turn,
        };
        (abilities, env)
    }
}

fn dispatch_abilities(
    event: &mut Event,
    ctx: &mut EngineContext,
    queue: &mut EventQueue,
) -> std::result::Result<(), HandlerError> {
    let (abilities, mut env) = ctx.split();
    abilities.dispatch(event, &mut env, queue);
    Ok(())
}

/// Resolves turns for one game.
///
/// Mutating entry points take `&mut self`, so overlapping turns on one engine
/// cannot be expressed.
pub struct TurnEngine {
    bus: EventBus<EngineContext>,
    ctx: EngineContext,
    phase: TurnPhase,
    started: bool,
    finished: bool,
}

impl TurnEngine {
    /// Engine with the built-in effect catalog and ability registry.
    pub fn new(config: GameConfig, roster: Roster, seed: u64) -> Self {
        let status = StatusEffectEngine::builtin(config.clone());
        let abilities = AbilityRuntime::new(AbilityRegistry::builtin());
        Self::with_parts(config, roster, seed, status, abilities)
    }

    pub fn with_parts(
        config: GameConfig,
        roster: Roster,
        seed: u64,
        status: StatusEffectEngine,
        abilities: AbilityRuntime,
    ) -> Self {
        let mut bus = EventBus::new();
        for kind in EventKind::iter() {
            bus.subscribe(kind, dispatch_abilities);
        }

        Self {
            bus,
            ctx: EngineContext {
                config,
                seed,
                roster,
                status,
                abilities,
                counters: EngineCounters::default(),
                log: TurnLog::new(),
            },
            phase: TurnPhase::Idle,
            started: false,
            finished: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.ctx.config
    }

    pub fn seed(&self) -> u64 {
        self.ctx.seed
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    /// Direct roster access for setup between turns.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.ctx.roster
    }

    pub fn abilities(&self) -> &AbilityRuntime {
        &self.ctx.abilities
    }

    pub fn abilities_mut(&mut self) -> &mut AbilityRuntime {
        &mut self.ctx.abilities
    }

    pub fn status_engine(&self) -> &StatusEffectEngine {
        &self.ctx.status
    }

    pub fn counters(&self) -> &EngineCounters {
        &self.ctx.counters
    }

    /// Number of the last resolved turn.
    pub fn turn(&self) -> u32 {
        self.ctx.counters.turn
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The game is over once at most one player is alive.
    pub fn is_game_over(&self) -> bool {
        self.ctx.roster.alive_count() <= 1
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.ctx.roster.winner()
    }

    /// Every event dispatched so far.
    pub fn history(&self) -> &[Event] {
        self.bus.history()
    }

    pub fn history_len(&self) -> usize {
        self.bus.history_len()
    }

    pub fn history_since(&self, mark: usize) -> &[Event] {
        self.bus.history_since(mark)
    }

    pub fn bind_ability(&mut self, owner: PlayerId, ability_id: &str) -> std::result::Result<(), BindError> {
        let EngineContext {
            abilities, roster, ..
        } = &mut self.ctx;
        abilities.bind(roster, owner, ability_id)
    }

    /// Registers an external subscriber. It runs after the ability runtime.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Event, &mut EngineContext, &mut EventQueue) -> std::result::Result<(), HandlerError>
            + Send
            + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Applies an effect from outside the turn flow and announces it.
    pub fn apply_status(
        &mut self,
        player: PlayerId,
        effect_id: &str,
        duration: i32,
        stacks: u32,
    ) -> Result<StatusChange> {
        let change = self
            .ctx
            .status
            .apply(&mut self.ctx.roster, player, effect_id, duration, stacks)?;
        let effect = change.effect();
        let payload = EventPayload::StatusEffectApplied {
            player,
            effect_id: effect.id.clone(),
            stacks: effect.stacks,
            duration: effect.duration,
        };
        self.emit(payload)?;
        Ok(change)
    }

    pub fn remove_status(&mut self, player: PlayerId, effect_id: &str) -> Result<bool> {
        let removed = self
            .ctx
            .status
            .remove(&mut self.ctx.roster, player, effect_id)?;
        if removed.is_some() {
            self.emit(EventPayload::StatusEffectRemoved {
                player,
                effect_id: effect_id.to_string(),
            })?;
        }
        Ok(removed.is_some())
    }

    /// Emits `GameStart` once and returns the log lines it produced.
    pub fn start_game(&mut self) -> Result<Vec<String>> {
        self.emit_game_start()?;
        Ok(self.ctx.log.take())
    }

    pub(crate) fn emit_game_start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        let players = self.ctx.roster.len() as u32;
        info!(target: "arena::engine", players, seed = self.ctx.seed, "game started");
        self.emit(EventPayload::GameStart { players })?;
        Ok(())
    }

    /// Emits `GameEnd` and returns the winner with the final log lines.
    pub fn end_game(&mut self) -> Result<(Option<PlayerId>, Vec<String>)> {
        if self.finished {
            return Err(EngineError::GameOver);
        }
        self.emit_game_start()?;
        let winner = self.winner();
        let turn = self.turn();
        self.emit(EventPayload::GameEnd { turn, winner })?;
        self.finished = true;
        info!(target: "arena::engine", turn, winner = ?winner, "game ended");
        Ok((winner, self.ctx.log.take()))
    }

    /// Copies game truth into a snapshot carrying `events`.
    pub fn snapshot(&self, events: Vec<Event>) -> Snapshot {
        Snapshot {
            turn: self.ctx.counters.turn,
            roster: self.ctx.roster.clone(),
            abilities: self.ctx.abilities.instances().to_vec(),
            counters: self.ctx.counters.clone(),
            events,
        }
    }

    /// Restores game truth from `snapshot` with `history` as the full event
    /// history. Also clears an aborted turn.
    pub fn restore(&mut self, snapshot: &Snapshot, history: Vec<Event>) {
        self.ctx.roster = snapshot.roster.clone();
        self.ctx.abilities.restore(snapshot.abilities.clone());
        self.ctx.counters = snapshot.counters.clone();
        self.ctx.log = TurnLog::new();
        self.bus.restore_history(history);
        self.phase = TurnPhase::Idle;
        self.finished = false;
        info!(target: "arena::engine", turn = snapshot.turn, "state restored");
    }

    fn emit(&mut self, payload: EventPayload) -> Result<Event> {
        Ok(self.bus.emit(Event::new(payload), &mut self.ctx)?)
    }

    fn enter(&mut self, phase: TurnPhase) {
        trace!(target: "arena::engine", from = %self.phase, to = %phase, "phase");
        self.phase = phase;
    }
}
