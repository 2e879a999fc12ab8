//! Handle through which ability code touches the game.

use arena_core::{
    DeathCause, EventPayload, GameConfig, Player, PlayerId, Roster, StatusChange,
    StatusEffectEngine,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{AbilityError, AbilityInstance, Scope};
use crate::engine::TurnLog;
use crate::events::EventQueue;

/// Shared game state lent to the ability runtime for one dispatch or execution.
pub struct AbilityEnv<'a> {
    pub roster: &'a mut Roster,
    pub status: &'a StatusEffectEngine,
    pub log: &'a mut TurnLog,
    pub config: &'a GameConfig,
    pub turn: u32,
}

/// Context passed to [`super::Ability::execute`] and [`super::Ability::on_event`].
///
/// Events raised through the context are queued and dispatched after the
/// current handler returns, never inline.
pub struct AbilityContext<'a> {
    roster: &'a mut Roster,
    status: &'a StatusEffectEngine,
    log: &'a mut TurnLog,
    config: &'a GameConfig,
    turn: u32,
    queue: &'a mut EventQueue,
    instance: &'a mut AbilityInstance,
}

impl<'a> AbilityContext<'a> {
    pub(crate) fn new(
        env: &'a mut AbilityEnv<'_>,
        queue: &'a mut EventQueue,
        instance: &'a mut AbilityInstance,
    ) -> Self {
        Self {
            roster: &mut *env.roster,
            status: env.status,
            log: &mut *env.log,
            config: env.config,
            turn: env.turn,
            queue,
            instance,
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.instance.owner
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn config(&self) -> &GameConfig {
        self.config
    }

    pub fn roster(&self) -> &Roster {
        self.roster
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    pub fn owner_name(&self) -> String {
        self.roster.name_of(self.instance.owner)
    }

    pub fn instance(&self) -> &AbilityInstance {
        self.instance
    }

    /// Spends a use and starts the cooldown. Passive abilities call this
    /// themselves; player-triggered uses are consumed by the runtime.
    pub fn consume_use(&mut self) {
        self.instance.consume_use();
    }

    pub fn get_var<T: DeserializeOwned>(&self, scope: Scope, key: &str, default: T) -> T {
        self.instance.vars.get(scope, key, default)
    }

    pub fn set_var(&mut self, scope: Scope, key: impl Into<String>, value: impl Into<Value>) {
        self.instance.vars.set(scope, key, value);
    }

    /// Turn scope for the turn being resolved.
    pub fn this_turn(&self) -> Scope {
        Scope::Turn(self.turn)
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.log.push(line);
    }

    /// Queues an event for dispatch after the current handler.
    pub fn emit(&mut self, payload: EventPayload) {
        self.queue.push(payload);
    }

    pub fn apply_status(
        &mut self,
        target: PlayerId,
        effect_id: &str,
        duration: i32,
        stacks: u32,
    ) -> Result<StatusChange, AbilityError> {
        let change = self
            .status
            .apply(self.roster, target, effect_id, duration, stacks)?;
        let effect = change.effect();
        self.queue.push(EventPayload::StatusEffectApplied {
            player: target,
            effect_id: effect.id.clone(),
            stacks: effect.stacks,
            duration: effect.duration,
        });
        Ok(change)
    }

    /// Removes an effect. Returns false if the target did not hold it.
    pub fn remove_status(&mut self, target: PlayerId, effect_id: &str) -> Result<bool, AbilityError> {
        let removed = self.status.remove(self.roster, target, effect_id)?;
        if removed.is_some() {
            self.queue.push(EventPayload::StatusEffectRemoved {
                player: target,
                effect_id: effect_id.to_string(),
            });
        }
        Ok(removed.is_some())
    }

    /// Deals damage credited to the owner. A lethal hit declares the death.
    pub fn damage(&mut self, target: PlayerId, amount: i32) -> Result<i32, AbilityError> {
        let owner = self.instance.owner;
        let player = self.roster.require_mut(target)?;
        if !player.is_alive() {
            return Ok(0);
        }
        let dealt = player.take_damage(amount);
        if player.hp <= 0 {
            player.mark_dead(Some(owner));
            self.log.defeated(self.roster, target, Some(owner));
            self.queue.push(EventPayload::Death {
                victim: target,
                killer: Some(owner),
                cause: DeathCause::Ability,
            });
        }
        Ok(dealt)
    }

    pub fn heal(&mut self, target: PlayerId, amount: i32) -> Result<i32, AbilityError> {
        Ok(self.roster.require_mut(target)?.heal(amount))
    }

    pub fn revive(&mut self, target: PlayerId, hp: i32) -> Result<(), AbilityError> {
        self.roster.revive(target, hp)?;
        Ok(())
    }
}
