use super::{EffectCatalog, StatusEffect};
use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{PlayerId, Roster};

/// Errors raised while applying or removing effects.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown status effect '{0}'")]
    UnknownEffect(String),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} is dead")]
    TargetDown(PlayerId),

    #[error("status ledger of {player} is full")]
    LedgerFull { player: PlayerId },

    #[error("invalid duration {0}: use a positive count or -1 for permanent")]
    InvalidDuration(i32),
}

impl GameError for StatusError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEffect(_) | Self::UnknownPlayer(_) | Self::InvalidDuration(_) => {
                ErrorSeverity::Validation
            }
            Self::TargetDown(_) | Self::LedgerFull { .. } => ErrorSeverity::Recoverable,
        }
    }
}

/// What [`StatusEffectEngine::apply`] did to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusChange {
    /// The player did not hold the effect.
    Applied(StatusEffect),
    /// A stackable effect was merged into the existing entry.
    Stacked { previous_stacks: u32, effect: StatusEffect },
    /// A non-stackable effect was replaced by a fresh instance.
    Replaced(StatusEffect),
}

impl StatusChange {
    pub fn effect(&self) -> &StatusEffect {
        match self {
            Self::Applied(effect) | Self::Replaced(effect) => effect,
            Self::Stacked { effect, .. } => effect,
        }
    }
}

/// One hook invocation that changed HP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectTickReport {
    pub player: PlayerId,
    pub effect_id: String,
    pub damage: i32,
    pub heal: i32,
}

/// Outcome of a turn-start or turn-end pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusPass {
    pub turn: u32,
    pub ticks: Vec<EffectTickReport>,
    /// Effects removed during the pass, in removal order.
    pub removed: Vec<(PlayerId, StatusEffect)>,
    /// Living players whose HP dropped to zero or below during the pass.
    /// Declaring them dead is left to the caller.
    pub casualties: Vec<PlayerId>,
}

/// Applies, ticks and expires effects on roster players.
///
/// Hooks run per player in id order and per effect in ledger order, so a pass
/// is fully reproducible.
#[derive(Clone, Debug)]
pub struct StatusEffectEngine {
    catalog: EffectCatalog,
    config: GameConfig,
}

impl StatusEffectEngine {
    pub fn new(catalog: EffectCatalog, config: GameConfig) -> Self {
        Self { catalog, config }
    }

    pub fn builtin(config: GameConfig) -> Self {
        Self::new(EffectCatalog::builtin(), config)
    }

    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    /// Applies `stacks` of `effect_id` for `duration` turns.
    ///
    /// A stackable effect already held is merged: stacks add up to
    /// `max_stacks` and the longer duration wins (permanent beats any count).
    /// Anything else is inserted fresh.
    pub fn apply(
        &self,
        roster: &mut Roster,
        player: PlayerId,
        effect_id: &str,
        duration: i32,
        stacks: u32,
    ) -> Result<StatusChange, StatusError> {
        if duration < StatusEffect::PERMANENT || duration == 0 {
            return Err(StatusError::InvalidDuration(duration));
        }
        let def = self
            .catalog
            .get(effect_id)
            .ok_or_else(|| StatusError::UnknownEffect(effect_id.to_string()))?;
        let target = roster
            .get_mut(player)
            .ok_or(StatusError::UnknownPlayer(player))?;
        if !target.is_alive() {
            return Err(StatusError::TargetDown(player));
        }

        let stacks = stacks.max(1);
        if let Some(existing) = target.status_effects.get_mut(effect_id) {
            if existing.stackable {
                let previous_stacks = existing.stacks;
                existing.stacks = existing.stacks.saturating_add(stacks).min(existing.max_stacks);
                existing.duration = merge_duration(existing.duration, duration);
                return Ok(StatusChange::Stacked {
                    previous_stacks,
                    effect: existing.clone(),
                });
            }
            let fresh = def.instantiate(duration, stacks);
            *existing = fresh.clone();
            def.behavior.on_apply(target);
            return Ok(StatusChange::Replaced(fresh));
        }

        let fresh = def.instantiate(duration, stacks);
        target
            .status_effects
            .insert(fresh.clone())
            .map_err(|_| StatusError::LedgerFull { player })?;
        def.behavior.on_apply(target);
        Ok(StatusChange::Applied(fresh))
    }

    /// Fires the removal hook, then deletes the entry.
    pub fn remove(
        &self,
        roster: &mut Roster,
        player: PlayerId,
        effect_id: &str,
    ) -> Result<Option<StatusEffect>, StatusError> {
        let target = roster
            .get_mut(player)
            .ok_or(StatusError::UnknownPlayer(player))?;
        if !target.status_effects.contains(effect_id) {
            return Ok(None);
        }
        if let Some(def) = self.catalog.get(effect_id) {
            def.behavior.on_remove(target);
        }
        Ok(target.status_effects.remove(effect_id))
    }

    /// Runs every held effect's turn-start hook. Durations are untouched.
    pub fn process_turn_start(&self, roster: &mut Roster, turn: u32) -> StatusPass {
        self.run_pass(roster, turn, false)
    }

    /// Runs every held effect's turn-end hook, then decrements durations and
    /// removes what reached zero.
    pub fn process_turn_end(&self, roster: &mut Roster, turn: u32) -> StatusPass {
        self.run_pass(roster, turn, true)
    }

    fn run_pass(&self, roster: &mut Roster, turn: u32, turn_end: bool) -> StatusPass {
        let mut pass = StatusPass {
            turn,
            ..StatusPass::default()
        };
        let ids: Vec<PlayerId> = roster.alive_ids();

        for id in ids {
            let Some(player) = roster.get_mut(id) else {
                continue;
            };

            for effect_id in player.status_effects.ids() {
                if player.hp <= 0 {
                    break;
                }
                let Some(effect) = player.status_effects.get(&effect_id).cloned() else {
                    continue;
                };
                let Some(def) = self.catalog.get(&effect_id) else {
                    continue;
                };

                let tick = if turn_end {
                    def.behavior.on_turn_end(&effect, &self.config)
                } else {
                    def.behavior.on_turn_start(&effect, &self.config)
                };
                if tick.is_noop() {
                    continue;
                }

                let damage = player.take_damage(tick.damage);
                let heal = player.heal(tick.heal);
                if damage != 0 || heal != 0 {
                    pass.ticks.push(EffectTickReport {
                        player: id,
                        effect_id: effect_id.clone(),
                        damage,
                        heal,
                    });
                }
                if tick.expire {
                    def.behavior.on_remove(player);
                    if let Some(removed) = player.status_effects.remove(&effect_id) {
                        pass.removed.push((id, removed));
                    }
                }
            }

            if turn_end {
                for effect_id in player.status_effects.ids() {
                    let expired = match player.status_effects.get_mut(&effect_id) {
                        Some(effect) if !effect.is_permanent() => {
                            effect.duration = (effect.duration - 1).max(0);
                            effect.duration == 0
                        }
                        _ => false,
                    };
                    if expired {
                        if let Some(def) = self.catalog.get(&effect_id) {
                            def.behavior.on_remove(player);
                        }
                        if let Some(removed) = player.status_effects.remove(&effect_id) {
                            pass.removed.push((id, removed));
                        }
                    }
                }
            }

            if player.hp <= 0 {
                pass.casualties.push(id);
            }
        }

        pass
    }
}

fn merge_duration(existing: i32, incoming: i32) -> i32 {
    if existing == StatusEffect::PERMANENT || incoming == StatusEffect::PERMANENT {
        StatusEffect::PERMANENT
    } else {
        existing.max(incoming)
    }
}
