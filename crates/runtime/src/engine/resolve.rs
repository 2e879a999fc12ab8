//! Per-turn resolution.
//!
//! Phase order is fixed: status turn-start pass, `TurnStart`, Defend
//! declarations, Evade declarations, Attack and Ability declarations in input
//! order, perfect guard, status turn-end pass, death zone, `TurnEnd`,
//! cooldowns. Status-effect turn-end hooks therefore always resolve before
//! ability `TurnEnd` hooks.

use std::collections::BTreeSet;

use arena_core::{
    Action, ActionKind, AttackIntent, DeathCause, EventPayload, PcgRng, PlayerId, RngOracle,
    StatusPass, TurnFlags, compute_seed, evade_chance, roll_succeeds,
};
use tracing::{debug, info, warn};

use super::{TurnEngine, TurnPhase, TurnResult};
use crate::abilities::{AbilityOutcome, AbilityParams};
use crate::api::{EngineError, Result};
use crate::events::EventQueue;

/// Per-turn bookkeeping that never outlives the turn.
struct TurnScratch {
    turn: u32,
    hp_at_start: Vec<i32>,
    /// Defenders whose spent gauge point was already reported in a `DefendAction`.
    guard_reported: BTreeSet<PlayerId>,
}

impl TurnEngine {
    /// Resolves one turn from the declared actions.
    ///
    /// Invalid declarations are dropped with a log line. Any error returned
    /// here is fatal for the turn and leaves the engine outside
    /// [`TurnPhase::Idle`]; restore a snapshot to continue.
    pub fn process_turn(&mut self, actions: &[Action]) -> Result<TurnResult> {
        if !self.phase.is_idle() {
            return Err(EngineError::Aborted { phase: self.phase });
        }
        if self.finished || self.is_game_over() {
            return Err(EngineError::GameOver);
        }
        self.emit_game_start()?;

        let turn = self.ctx.counters.turn + 1;
        self.ctx.counters.turn = turn;
        info!(target: "arena::engine", turn, declared = actions.len(), "turn started");

        self.enter(TurnPhase::TurnStart);
        for player in self.ctx.roster.iter_mut() {
            player.flags.remove(TurnFlags::PER_TURN);
        }
        let accepted = self.validate(actions);
        let pass = self
            .ctx
            .status
            .process_turn_start(&mut self.ctx.roster, turn);
        self.settle_status_pass(pass)?;
        self.emit(EventPayload::TurnStart { turn })?;
        let mut scratch = TurnScratch {
            turn,
            hp_at_start: self.ctx.roster.iter().map(|p| p.hp).collect(),
            guard_reported: BTreeSet::new(),
        };

        self.enter(TurnPhase::DeclareDefend);
        for action in accepted.iter().filter(|a| a.kind == ActionKind::Defend) {
            self.resolve_defend(action.actor)?;
        }

        self.enter(TurnPhase::DeclareEvade);
        for action in accepted.iter().filter(|a| a.kind == ActionKind::Evade) {
            self.resolve_evade(action.actor)?;
        }

        self.enter(TurnPhase::ResolveAttacksAndAbilities);
        for action in &accepted {
            match action.kind {
                ActionKind::Attack => self.resolve_attack(action, &mut scratch)?,
                ActionKind::Ability => self.resolve_ability(action, turn)?,
                ActionKind::Defend | ActionKind::Evade | ActionKind::Pass => {}
            }
        }

        self.enter(TurnPhase::PerfectGuardCheck);
        self.check_perfect_guard(&scratch)?;

        self.enter(TurnPhase::StatusEffectTurnEnd);
        let pass = self.ctx.status.process_turn_end(&mut self.ctx.roster, turn);
        self.settle_status_pass(pass)?;

        self.enter(TurnPhase::DeathZoneCheck);
        self.check_death_zone(turn)?;

        self.enter(TurnPhase::TurnEnd);
        self.emit(EventPayload::TurnEnd { turn })?;

        self.enter(TurnPhase::CooldownUpdate);
        self.ctx.abilities.tick_cooldowns();
        self.ctx.abilities.purge_turn_vars(turn);
        self.ctx.roster.check_invariants()?;

        self.enter(TurnPhase::Idle);
        let game_over = self.is_game_over();
        let winner = self.winner();
        info!(
            target: "arena::engine",
            turn,
            alive = self.ctx.roster.alive_count(),
            game_over,
            "turn resolved"
        );

        Ok(TurnResult {
            turn_number: turn,
            actions: accepted,
            logs: self.ctx.log.take(),
            players: self.ctx.roster.players().to_vec(),
            is_death_zone: self.ctx.config.is_death_zone(turn),
            game_over,
            winner,
        })
    }

    /// Keeps the first declaration of every living player that names valid
    /// players.
    fn validate(&mut self, actions: &[Action]) -> Vec<Action> {
        let mut seen = BTreeSet::new();
        let mut accepted = Vec::with_capacity(actions.len());

        for action in actions {
            let roster = &self.ctx.roster;
            let reason = if !roster.contains(action.actor) {
                Some(format!("unknown player {}", action.actor))
            } else if !roster.is_alive(action.actor) {
                Some(format!("{} is defeated", roster.name_of(action.actor)))
            } else if seen.contains(&action.actor) {
                Some(format!("{} already declared", roster.name_of(action.actor)))
            } else if action.kind.requires_target() && action.target.is_none() {
                Some(format!("{} needs a target", action.kind))
            } else if let Some(target) = action.target.filter(|&t| !roster.contains(t)) {
                Some(format!("unknown target {target}"))
            } else if action.kind == ActionKind::Attack && action.target == Some(action.actor) {
                Some(format!("{} cannot attack self", roster.name_of(action.actor)))
            } else {
                None
            };

            match reason {
                Some(reason) => {
                    warn!(target: "arena::engine", action = %action, %reason, "action dropped");
                    self.ctx.log.push(format!("Ignored {}: {reason}", action.kind));
                }
                None => {
                    seen.insert(action.actor);
                    accepted.push(action.clone());
                }
            }
        }
        accepted
    }

    fn name(&self, id: PlayerId) -> String {
        self.ctx.roster.name_of(id)
    }

    fn resolve_defend(&mut self, actor: PlayerId) -> Result<()> {
        let name = self.name(actor);
        let event = self.emit(EventPayload::BeforeDefend { player: actor })?;
        if event.is_cancelled() {
            self.ctx.log.push(format!("{name}'s defense was interrupted"));
            return Ok(());
        }

        let player = self.ctx.roster.require_mut(actor)?;
        if player.is_defense_sealed() {
            self.ctx.log.push(format!("{name} cannot defend while sealed"));
            return Ok(());
        }
        if player.defense_gauge == 0 {
            self.ctx
                .log
                .push(format!("{name} failed to defend: insufficient gauge"));
            return Ok(());
        }
        player.spend_defense()?;
        player.flags.insert(TurnFlags::HAS_DEFENDED);
        let gauge_left = player.defense_gauge;

        self.ctx
            .log
            .push(format!("{name} is defending ({gauge_left} gauge left)"));
        self.emit(EventPayload::AfterDefend {
            player: actor,
            gauge_left,
        })?;
        Ok(())
    }

    fn resolve_evade(&mut self, actor: PlayerId) -> Result<()> {
        let name = self.name(actor);
        let evade_count = self.ctx.roster.require(actor)?.evade_count;
        let event = self.emit(EventPayload::EvadeAction {
            player: actor,
            evade_count,
        })?;
        if event.is_cancelled() {
            self.ctx.log.push(format!("{name} could not get ready to evade"));
            return Ok(());
        }

        let player = self.ctx.roster.require_mut(actor)?;
        player.flags.insert(TurnFlags::EVADING);
        player.evade_count += 1;
        self.ctx.log.push(format!("{name} prepares to evade"));
        Ok(())
    }

    fn resolve_attack(&mut self, action: &Action, scratch: &mut TurnScratch) -> Result<()> {
        let attacker = action.actor;
        let Some(declared) = action.target else {
            return Ok(());
        };
        let attacker_name = self.name(attacker);
        let declared_name = self.name(declared);
        if !self.ctx.roster.is_alive(declared) {
            self.ctx.log.push(format!(
                "{attacker_name}'s attack on {declared_name} was dropped: target already defeated"
            ));
            return Ok(());
        }

        let player = self.ctx.roster.require_mut(attacker)?;
        player.evade_count = player.evade_count.saturating_sub(1);
        let mut damage = player.attack;

        let streak = self
            .ctx
            .counters
            .record_attack(attacker, declared, scratch.turn);
        if streak >= self.ctx.config.focus_attack_threshold {
            self.ctx.counters.reset_focus(attacker);
            let event = self.emit(EventPayload::FocusAttack {
                attacker,
                target: declared,
                streak,
                bonus: self.ctx.config.focus_attack_bonus,
            })?;
            if !event.is_cancelled()
                && let EventPayload::FocusAttack { bonus, .. } = *event.payload()
            {
                damage += bonus;
                self.ctx.log.push(format!(
                    "{attacker_name} focuses on {declared_name}: +{bonus} damage"
                ));
            }
        }

        let event = self.emit(EventPayload::BeforeAttack(AttackIntent::new(
            attacker, declared, damage,
        )))?;
        if event.is_cancelled() {
            self.ctx
                .log
                .push(format!("{attacker_name}'s attack was stopped"));
            return Ok(());
        }
        let Some(intent) = event.attack_intent().cloned() else {
            return Ok(());
        };
        self.ctx
            .roster
            .require_mut(declared)?
            .flags
            .insert(TurnFlags::WAS_ATTACKED);
        let target = intent.target;
        let target_name = self.name(target);
        if !self.ctx.roster.is_alive(target) {
            self.ctx.log.push(format!(
                "{attacker_name}'s attack on {target_name} was dropped: target already defeated"
            ));
            return Ok(());
        }

        let player = self.ctx.roster.require_mut(target)?;
        player.flags.insert(TurnFlags::WAS_ATTACKED);
        let defended = player.has_flag(TurnFlags::HAS_DEFENDED);
        let evading = player.has_flag(TurnFlags::EVADING);

        if defended && !intent.ignore_defense {
            let gauge_consumed = u32::from(scratch.guard_reported.insert(target));
            self.ctx.log.push(format!(
                "{target_name} blocked {attacker_name}'s attack, nullifying {} damage",
                intent.damage
            ));
            self.emit(EventPayload::DefendAction {
                defender: target,
                attacker,
                blocked: intent.damage,
                gauge_consumed,
            })?;
            return Ok(());
        }

        if evading && !intent.ignore_evade && self.try_evade(attacker, target, scratch.turn)? {
            self.ctx
                .log
                .push(format!("{target_name} evaded {attacker_name}'s attack"));
            return Ok(());
        }

        let player = self.ctx.roster.require_mut(target)?;
        let dealt = player.take_damage(intent.damage);
        let remaining_hp = player.hp;
        self.ctx.log.push(format!(
            "{attacker_name} hit {target_name} for {dealt} damage"
        ));
        debug!(
            target: "arena::engine",
            attacker = %attacker,
            target = %target,
            dealt,
            remaining_hp,
            "attack landed"
        );
        self.emit(EventPayload::AfterAttack {
            attacker,
            target,
            damage: dealt,
            remaining_hp,
        })?;

        self.kill_if_down(target, Some(attacker), DeathCause::Attack)
    }

    /// Rolls an evade attempt. Returns true when the attack is avoided.
    fn try_evade(&mut self, attacker: PlayerId, target: PlayerId, turn: u32) -> Result<bool> {
        let evade_count = self.ctx.roster.require(target)?.evade_count;
        let chance = evade_chance(
            self.ctx.roster.alive_count(),
            evade_count,
            self.ctx.config.evade_chance_per_player,
        );
        let event = self.emit(EventPayload::BeforeEvade {
            defender: target,
            attacker,
            chance,
        })?;
        if event.is_cancelled() {
            return Ok(false);
        }
        let chance = match *event.payload() {
            EventPayload::BeforeEvade { chance, .. } => chance.min(100),
            _ => chance,
        };

        let roll = PcgRng.roll_d100(compute_seed(self.ctx.seed, turn, target.0, attacker.0));
        let success = roll_succeeds(roll, chance);
        debug!(
            target: "arena::engine",
            defender = %target,
            attacker = %attacker,
            chance,
            roll,
            success,
            "evade roll"
        );
        self.emit(EventPayload::AfterEvade {
            defender: target,
            attacker,
            chance,
            roll,
            success,
        })?;
        Ok(success)
    }

    fn resolve_ability(&mut self, action: &Action, turn: u32) -> Result<()> {
        let actor = action.actor;
        let ability_id = action
            .ability_id
            .clone()
            .or_else(|| {
                self.ctx
                    .abilities
                    .instance(actor)
                    .map(|instance| instance.ability_id.clone())
            })
            .unwrap_or_default();

        let event = self.emit(EventPayload::AbilityUse {
            actor,
            ability_id,
            target: action.target,
        })?;
        if event.is_cancelled() {
            let name = self.name(actor);
            self.ctx.log.push(format!("{name}'s ability was interrupted"));
            return Ok(());
        }

        let params = AbilityParams {
            actor,
            target: action.target,
            turn,
        };
        let mut queue = EventQueue::new();
        let outcome = {
            let (abilities, mut env) = self.ctx.split();
            abilities.execute(&mut env, &mut queue, &params, action.ability_id.as_deref())
        };
        self.bus.emit_all(&mut queue, &mut self.ctx)?;
        self.merge_outcome(action, outcome)
    }

    /// Applies an ability's structured result to the roster.
    fn merge_outcome(&mut self, action: &Action, outcome: AbilityOutcome) -> Result<()> {
        let actor = action.actor;
        if !outcome.message.is_empty() {
            self.ctx.log.push(outcome.message.clone());
        }
        if !outcome.success {
            debug!(
                target: "arena::engine",
                actor = %actor,
                message = %outcome.message,
                "ability use failed"
            );
            return Ok(());
        }

        if let Some(target) = outcome.target
            && self.ctx.roster.get(target).is_none()
        {
            self.reject_outcome(actor, format!("unknown target {target}"));
            return Ok(());
        }

        let strike_target = outcome.target.or(action.target);
        if let Some(amount) = outcome.damage
            && let Some(target) = strike_target
            && self.ctx.roster.is_alive(target)
        {
            let dealt = self.ctx.roster.require_mut(target)?.take_damage(amount);
            let name = self.name(target);
            self.ctx.log.push(format!("{name} took {dealt} damage"));
            self.kill_if_down(target, Some(actor), DeathCause::Ability)?;
        }

        if let Some(amount) = outcome.heal {
            let heal_target = outcome.target.unwrap_or(actor);
            if self.ctx.roster.is_alive(heal_target) {
                let healed = self.ctx.roster.require_mut(heal_target)?.heal(amount);
                if healed > 0 {
                    let name = self.name(heal_target);
                    self.ctx.log.push(format!("{name} recovered {healed} HP"));
                }
            } else {
                let name = self.name(heal_target);
                self.reject_outcome(actor, format!("cannot heal defeated {name}"));
            }
        }

        if outcome.death
            && let Some(target) = strike_target
            && self.ctx.roster.is_alive(target)
        {
            let player = self.ctx.roster.require_mut(target)?;
            player.hp = player.hp.min(0);
            self.kill_if_down(target, Some(actor), DeathCause::Ability)?;
        }
        Ok(())
    }

    fn reject_outcome(&mut self, actor: PlayerId, reason: String) {
        let name = self.name(actor);
        warn!(target: "arena::engine", actor = %actor, reason = %reason, "ability outcome rejected");
        self.ctx
            .log
            .push(format!("{name}'s ability misfired: {reason}"));
        let (abilities, mut env) = self.ctx.split();
        abilities.reject_outcome(actor, reason, &mut env);
    }

    /// Grants +1 gauge to every living player who was attacked, lost no HP,
    /// and did not spend gauge on Defend this turn.
    fn check_perfect_guard(&mut self, scratch: &TurnScratch) -> Result<()> {
        let guarded: Vec<PlayerId> = self
            .ctx
            .roster
            .alive()
            .filter(|p| {
                p.has_flag(TurnFlags::WAS_ATTACKED)
                    && !p.has_flag(TurnFlags::HAS_DEFENDED)
                    && scratch.hp_at_start.get(p.id.index()) == Some(&p.hp)
                    && p.defense_gauge < p.max_defense_gauge
            })
            .map(|p| p.id)
            .collect();

        for id in guarded {
            let player = self.ctx.roster.require_mut(id)?;
            player.gain_defense();
            let gauge = player.defense_gauge;
            let name = self.name(id);
            self.ctx
                .log
                .push(format!("{name} achieved a perfect guard (gauge {gauge})"));
            self.emit(EventPayload::PerfectGuard { player: id, gauge })?;
        }
        Ok(())
    }

    fn settle_status_pass(&mut self, pass: StatusPass) -> Result<()> {
        for tick in &pass.ticks {
            let name = self.name(tick.player);
            if tick.damage > 0 {
                self.ctx.log.push(format!(
                    "{name} took {} damage from {}",
                    tick.damage, tick.effect_id
                ));
            }
            if tick.heal > 0 {
                self.ctx.log.push(format!(
                    "{name} recovered {} HP from {}",
                    tick.heal, tick.effect_id
                ));
            }
        }

        for (player, effect) in pass.removed {
            let name = self.name(player);
            self.ctx.log.push(format!("{name}'s {} wore off", effect.name));
            self.emit(EventPayload::StatusEffectRemoved {
                player,
                effect_id: effect.id,
            })?;
        }

        for victim in pass.casualties {
            self.kill_if_down(victim, None, DeathCause::StatusEffect)?;
        }
        Ok(())
    }

    fn check_death_zone(&mut self, turn: u32) -> Result<()> {
        if !self.ctx.config.is_death_zone_escalation(turn) {
            return Ok(());
        }

        self.ctx.counters.death_zone_stage += 1;
        let stage = self.ctx.counters.death_zone_stage;
        let damage = stage as i32 * self.ctx.config.death_zone_damage_per_stage;
        let event = self.emit(EventPayload::DeathZone {
            turn,
            stage,
            damage,
        })?;
        if event.is_cancelled() {
            return Ok(());
        }
        let damage = match *event.payload() {
            EventPayload::DeathZone { damage, .. } => damage,
            _ => damage,
        };

        info!(target: "arena::engine", turn, stage, damage, "death zone escalated");
        self.ctx.log.push(format!(
            "The death zone closes in (stage {stage}): everyone loses {damage} HP"
        ));
        let victims = self.ctx.roster.alive_ids();
        for &id in &victims {
            self.ctx.roster.require_mut(id)?.take_damage(damage);
        }
        for id in victims {
            self.kill_if_down(id, None, DeathCause::DeathZone)?;
        }
        Ok(())
    }

    /// Declares `victim` dead if it is alive with no HP left.
    fn kill_if_down(
        &mut self,
        victim: PlayerId,
        killer: Option<PlayerId>,
        cause: DeathCause,
    ) -> Result<()> {
        let Some(player) = self.ctx.roster.get_mut(victim) else {
            return Ok(());
        };
        if !player.is_alive() || player.hp > 0 {
            return Ok(());
        }

        player.mark_dead(killer);
        self.ctx.log.defeated(&self.ctx.roster, victim, killer);
        info!(
            target: "arena::engine",
            victim = %victim,
            killer = ?killer,
            cause = ?cause,
            "player defeated"
        );
        self.emit(EventPayload::Death {
            victim,
            killer,
            cause,
        })?;
        Ok(())
    }
}
