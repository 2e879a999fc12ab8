//! Built-in effect definitions and their behavior.

use std::collections::BTreeMap;

use super::{EffectKind, StatusEffect};
use crate::config::GameConfig;
use crate::state::{Player, TurnFlags};

/// Identifiers of the built-in effects.
pub mod effect_ids {
    pub const CRACK: &str = "crack";
    pub const POISON: &str = "poison";
    pub const REGENERATION: &str = "regeneration";
    pub const ABILITY_SEAL: &str = "ability_seal";
    pub const DEFENSE_SEAL: &str = "defense_seal";
    pub const FORTIFY: &str = "fortify";
}

/// Closed set of effect behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectBehavior {
    /// Bursts for `crack_damage` and clears itself once stacks reach `crack_threshold`.
    Crack,
    /// Loses `damage` HP per stack at every turn end.
    Poison { damage: i32 },
    /// Recovers `heal` HP at every turn start.
    Regeneration { heal: i32 },
    /// Holds [`TurnFlags::ABILITY_SEALED`] while present.
    AbilitySeal,
    /// Holds [`TurnFlags::DEFENSE_SEALED`] while present.
    DefenseSeal,
    /// No behavior of its own; abilities read it.
    Marker,
}

/// HP change requested by an effect hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectTick {
    pub damage: i32,
    pub heal: i32,
    /// Remove the effect right after this tick.
    pub expire: bool,
}

impl EffectTick {
    pub fn is_noop(&self) -> bool {
        self.damage == 0 && self.heal == 0 && !self.expire
    }
}

impl EffectBehavior {
    pub(crate) fn on_apply(&self, player: &mut Player) {
        match self {
            Self::AbilitySeal => player.flags.insert(TurnFlags::ABILITY_SEALED),
            Self::DefenseSeal => player.flags.insert(TurnFlags::DEFENSE_SEALED),
            _ => {}
        }
    }

    pub(crate) fn on_remove(&self, player: &mut Player) {
        match self {
            Self::AbilitySeal => player.flags.remove(TurnFlags::ABILITY_SEALED),
            Self::DefenseSeal => player.flags.remove(TurnFlags::DEFENSE_SEALED),
            _ => {}
        }
    }

    pub(crate) fn on_turn_start(&self, _effect: &StatusEffect, _config: &GameConfig) -> EffectTick {
        match *self {
            Self::Regeneration { heal } => EffectTick {
                heal,
                ..EffectTick::default()
            },
            _ => EffectTick::default(),
        }
    }

    pub(crate) fn on_turn_end(&self, effect: &StatusEffect, config: &GameConfig) -> EffectTick {
        match *self {
            Self::Crack if effect.stacks >= config.crack_threshold => EffectTick {
                damage: config.crack_damage,
                heal: 0,
                expire: true,
            },
            Self::Poison { damage } => EffectTick {
                damage: damage * effect.stacks as i32,
                ..EffectTick::default()
            },
            _ => EffectTick::default(),
        }
    }
}

/// Static description of an effect type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectDef {
    pub id: String,
    pub name: String,
    pub kind: EffectKind,
    pub max_stacks: u32,
    pub stackable: bool,
    pub behavior: EffectBehavior,
}

impl EffectDef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: EffectKind,
        behavior: EffectBehavior,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            max_stacks: 1,
            stackable: false,
            behavior,
        }
    }

    pub fn stackable(mut self, max_stacks: u32) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks.max(1);
        self
    }

    pub(crate) fn instantiate(&self, duration: i32, stacks: u32) -> StatusEffect {
        StatusEffect {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            stacks: stacks.clamp(1, self.max_stacks),
            max_stacks: self.max_stacks,
            duration,
            stackable: self.stackable,
        }
    }
}

/// Lookup table of effect definitions, built once per game.
#[derive(Clone, Debug, Default)]
pub struct EffectCatalog {
    defs: BTreeMap<String, EffectDef>,
}

impl EffectCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        use effect_ids::*;

        let mut catalog = Self::empty();
        catalog.register(
            EffectDef::new(CRACK, "Crack", EffectKind::Debuff, EffectBehavior::Crack).stackable(3),
        );
        catalog.register(
            EffectDef::new(
                POISON,
                "Poison",
                EffectKind::Debuff,
                EffectBehavior::Poison { damage: 1 },
            )
            .stackable(3),
        );
        catalog.register(EffectDef::new(
            REGENERATION,
            "Regeneration",
            EffectKind::Buff,
            EffectBehavior::Regeneration { heal: 1 },
        ));
        catalog.register(EffectDef::new(
            ABILITY_SEAL,
            "Ability Seal",
            EffectKind::Debuff,
            EffectBehavior::AbilitySeal,
        ));
        catalog.register(EffectDef::new(
            DEFENSE_SEAL,
            "Defense Seal",
            EffectKind::Debuff,
            EffectBehavior::DefenseSeal,
        ));
        catalog.register(
            EffectDef::new(FORTIFY, "Fortify", EffectKind::Neutral, EffectBehavior::Marker)
                .stackable(5),
        );
        catalog
    }

    /// Registers (or replaces) a definition.
    pub fn register(&mut self, def: EffectDef) {
        self.defs.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&EffectDef> {
        self.defs.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }
}
