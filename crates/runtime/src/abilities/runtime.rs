//! Ability binding, gating and fault-isolating dispatch.

use std::any::Any;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use arena_core::{ErrorSeverity, Event, EventKind, GameError, Player, PlayerId, Roster};
use tracing::{debug, error, warn};

use super::{
    AbilityContext, AbilityEnv, AbilityError, AbilityInstance, AbilityOutcome, AbilityParams,
    AbilityRegistry, VarMap,
};
use crate::events::EventQueue;

/// Errors raised when binding abilities to players.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("unknown ability '{0}'")]
    UnknownAbility(String),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {player} already has '{ability}' bound")]
    AlreadyBound { player: PlayerId, ability: String },
}

impl GameError for BindError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }
}

/// An unexpected failure inside ability code, caught at the dispatch boundary.
#[derive(Debug, thiserror::Error)]
pub enum AbilityFault {
    #[error(transparent)]
    Error(#[from] AbilityError),

    #[error("panicked: {0}")]
    Panic(String),

    #[error("took {elapsed:?}, over the {budget:?} budget")]
    Overtime { elapsed: Duration, budget: Duration },

    #[error("invalid outcome: {0}")]
    InvalidOutcome(String),
}

/// Owns every bound [`AbilityInstance`] of one game.
#[derive(Debug)]
pub struct AbilityRuntime {
    registry: AbilityRegistry,
    instances: Vec<AbilityInstance>,
    error_threshold: u32,
    hook_time_budget: Option<Duration>,
    /// Permanent tiers as last written to the data store, keyed by storage key.
    persisted: BTreeMap<String, VarMap>,
}

impl AbilityRuntime {
    pub const DEFAULT_ERROR_THRESHOLD: u32 = 3;

    pub fn new(registry: AbilityRegistry) -> Self {
        Self {
            registry,
            instances: Vec::new(),
            error_threshold: Self::DEFAULT_ERROR_THRESHOLD,
            hook_time_budget: None,
            persisted: BTreeMap::new(),
        }
    }

    /// An instance is disabled once its error count exceeds `threshold`.
    pub fn with_error_threshold(mut self, threshold: u32) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_hook_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.hook_time_budget = budget;
        self
    }

    pub fn registry(&self) -> &AbilityRegistry {
        &self.registry
    }

    pub fn error_threshold(&self) -> u32 {
        self.error_threshold
    }

    /// Binds `ability_id` to `owner`. A player holds at most one ability.
    pub fn bind(
        &mut self,
        roster: &mut Roster,
        owner: PlayerId,
        ability_id: &str,
    ) -> Result<(), BindError> {
        let ability = self
            .registry
            .get(ability_id)
            .ok_or_else(|| BindError::UnknownAbility(ability_id.to_string()))?;
        let player = roster
            .get_mut(owner)
            .ok_or(BindError::UnknownPlayer(owner))?;
        if let Some(existing) = self.instance(owner) {
            return Err(BindError::AlreadyBound {
                player: owner,
                ability: existing.ability_id.clone(),
            });
        }

        player.ability_id = Some(ability.id().to_string());
        self.instances.push(AbilityInstance::new(
            ability.id(),
            owner,
            ability.priority(),
            ability.max_cooldown(),
            ability.max_uses(),
        ));
        debug!(
            target: "arena::abilities",
            ability = ability.id(),
            owner = %owner,
            "ability bound"
        );
        Ok(())
    }

    pub fn unbind(&mut self, roster: &mut Roster, owner: PlayerId) -> Option<AbilityInstance> {
        let index = self.index_of(owner)?;
        if let Some(player) = roster.get_mut(owner) {
            player.ability_id = None;
        }
        Some(self.instances.remove(index))
    }

    pub fn instance(&self, owner: PlayerId) -> Option<&AbilityInstance> {
        self.instances.iter().find(|i| i.owner == owner)
    }

    pub fn instance_mut(&mut self, owner: PlayerId) -> Option<&mut AbilityInstance> {
        self.instances.iter_mut().find(|i| i.owner == owner)
    }

    /// Every instance in bind order.
    pub fn instances(&self) -> &[AbilityInstance] {
        &self.instances
    }

    /// Replaces all instance state, e.g. when restoring a snapshot.
    pub fn restore(&mut self, instances: Vec<AbilityInstance>) {
        self.instances = instances;
    }

    fn index_of(&self, owner: PlayerId) -> Option<usize> {
        self.instances.iter().position(|i| i.owner == owner)
    }

    /// Counts an outcome the engine refused to merge as a fault of `owner`'s
    /// instance, with the same auto-disable path as a failing hook.
    pub fn reject_outcome(&mut self, owner: PlayerId, reason: String, env: &mut AbilityEnv<'_>) {
        if let Some(index) = self.index_of(owner) {
            self.note_fault(index, "execute", &AbilityFault::InvalidOutcome(reason), env);
        }
    }

    /// Runs the actor's ability for a player-triggered use.
    ///
    /// Every gate is checked before ability code runs, so a refused use leaves
    /// the game untouched. A successful use spends a use and starts the
    /// cooldown. Faults come back as a failed outcome.
    pub fn execute(
        &mut self,
        env: &mut AbilityEnv<'_>,
        queue: &mut EventQueue,
        params: &AbilityParams,
        requested: Option<&str>,
    ) -> AbilityOutcome {
        let actor_name = env.roster.name_of(params.actor);
        let Some(index) = self.index_of(params.actor) else {
            return AbilityOutcome::failure(format!("{actor_name} has no ability"));
        };
        let instance = &self.instances[index];
        if let Some(requested) = requested
            && requested != instance.ability_id
        {
            return AbilityOutcome::failure(format!(
                "{actor_name} does not have '{requested}'"
            ));
        }
        if env
            .roster
            .get(params.actor)
            .is_some_and(Player::is_ability_sealed)
        {
            return AbilityOutcome::failure(format!("{actor_name}'s ability is sealed"));
        }
        let Some(ability) = self.registry.get(&instance.ability_id) else {
            return AbilityOutcome::failure(format!(
                "unknown ability '{}'",
                instance.ability_id
            ));
        };
        if let Err(reason) = ability.check_ready(instance) {
            return AbilityOutcome::failure(format!("{}: {reason}", ability.name()));
        }

        let result = self.guarded(index, |instance| {
            let mut ctx = AbilityContext::new(env, queue, instance);
            ability.execute(&mut ctx, params)
        });
        match result {
            Ok(outcome) => {
                if outcome.success {
                    self.instances[index].consume_use();
                }
                outcome
            }
            Err(fault) => {
                self.note_fault(index, "execute", &fault, env);
                AbilityOutcome::failure(format!("{} failed", ability.name()))
            }
        }
    }

    /// Runs every hook registered for the event's kind.
    ///
    /// Owners must be alive, except for `Death` so abilities can react to
    /// their own owner's death. Dispatch stops as soon as a hook cancels the
    /// event.
    pub fn dispatch(&mut self, event: &mut Event, env: &mut AbilityEnv<'_>, queue: &mut EventQueue) {
        let kind = event.kind();
        let hook: &'static str = kind.into();

        for index in self.dispatch_order(kind) {
            let instance = &self.instances[index];
            if !instance.is_active {
                continue;
            }
            if kind != EventKind::Death && !env.roster.is_alive(instance.owner) {
                continue;
            }
            let Some(ability) = self.registry.get(&instance.ability_id) else {
                continue;
            };

            let result = self.guarded(index, |instance| {
                let mut ctx = AbilityContext::new(env, queue, instance);
                ability.on_event(event, &mut ctx)
            });
            if let Err(fault) = result {
                self.note_fault(index, hook, &fault, env);
            }
            if event.is_cancelled() {
                debug!(
                    target: "arena::abilities",
                    ability = ability.id(),
                    kind = hook,
                    "event cancelled by ability"
                );
                break;
            }
        }
    }

    /// Active instances hooking `kind`, highest priority first; ties keep
    /// bind order.
    fn dispatch_order(&self, kind: EventKind) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .instances
            .iter()
            .enumerate()
            .filter(|(_, instance)| instance.is_active)
            .filter(|(_, instance)| {
                self.registry
                    .get(&instance.ability_id)
                    .is_some_and(|ability| ability.hooks().contains(&kind))
            })
            .map(|(index, _)| index)
            .collect();
        order.sort_by_key(|&index| Reverse(self.instances[index].priority));
        order
    }

    fn guarded<T>(
        &mut self,
        index: usize,
        call: impl FnOnce(&mut AbilityInstance) -> Result<T, AbilityError>,
    ) -> Result<T, AbilityFault> {
        let instance = &mut self.instances[index];
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| call(instance)));
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(value)) => match self.hook_time_budget {
                Some(budget) if elapsed > budget => Err(AbilityFault::Overtime { elapsed, budget }),
                _ => Ok(value),
            },
            Ok(Err(err)) => Err(AbilityFault::Error(err)),
            Err(payload) => Err(AbilityFault::Panic(panic_message(payload.as_ref()))),
        }
    }

    fn note_fault(&mut self, index: usize, hook: &str, fault: &AbilityFault, env: &mut AbilityEnv<'_>) {
        let threshold = self.error_threshold;
        let instance = &mut self.instances[index];
        instance.error_count += 1;
        warn!(
            target: "arena::abilities",
            ability = %instance.ability_id,
            owner = %instance.owner,
            hook,
            error_count = instance.error_count,
            error = %fault,
            "ability fault isolated"
        );

        if instance.is_active && instance.error_count > threshold {
            instance.is_active = false;
            error!(
                target: "arena::abilities",
                ability = %instance.ability_id,
                owner = %instance.owner,
                error_count = instance.error_count,
                "ability disabled after repeated faults"
            );
            env.log.push(format!(
                "{}'s {} stopped working",
                env.roster.name_of(instance.owner),
                instance.ability_id
            ));
        }
    }

    /// Counts down every cooldown by one turn.
    pub fn tick_cooldowns(&mut self) {
        for instance in &mut self.instances {
            instance.tick_cooldown();
        }
    }

    pub fn purge_turn_vars(&mut self, turn: u32) {
        for instance in &mut self.instances {
            instance.vars.purge_turns_through(turn);
        }
    }

    /// Seeds the permanent tier of the instance stored under `key`.
    pub fn load_permanent(&mut self, key: &str, vars: VarMap) {
        if let Some(instance) = self.instances.iter_mut().find(|i| i.permanent_key() == key) {
            instance.vars.load_permanent(vars.clone());
            self.persisted.insert(key.to_string(), vars);
        }
    }

    /// Permanent tiers that changed since they were last persisted.
    pub fn pending_permanent(&self) -> Vec<(String, VarMap)> {
        self.instances
            .iter()
            .filter_map(|instance| {
                let key = instance.permanent_key();
                let current = instance.vars.permanent();
                let stored = self.persisted.get(&key);
                let changed = match stored {
                    Some(stored) => stored != current,
                    None => !current.is_empty(),
                };
                changed.then(|| (key, current.clone()))
            })
            .collect()
    }

    pub fn mark_persisted(&mut self, key: String, vars: VarMap) {
        self.persisted.insert(key, vars);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
