//! Stacking status effects.
//!
//! Each player carries a [`StatusEffects`] ledger keyed by effect id. The
//! [`StatusEffectEngine`] owns the effect catalog and is the only code that
//! applies, refreshes, ticks and expires entries.
//!
//! # Duration
//!
//! Durations count turn-end boundaries. An effect applied with duration 2
//! survives the end of the current turn and is removed at the end of the next
//! one. [`StatusEffect::PERMANENT`] (`-1`) never decrements.

mod catalog;
mod engine;

pub use catalog::{EffectBehavior, EffectCatalog, EffectDef, EffectTick, effect_ids};
pub use engine::{EffectTickReport, StatusChange, StatusEffectEngine, StatusError, StatusPass};

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Broad polarity of an effect, used for display and targeting rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    Buff,
    Debuff,
    Neutral,
}

/// One effect instance held by a player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub id: String,
    pub name: String,
    pub kind: EffectKind,
    pub stacks: u32,
    pub max_stacks: u32,
    /// Remaining turn-end boundaries, or [`StatusEffect::PERMANENT`].
    pub duration: i32,
    pub stackable: bool,
}

impl StatusEffect {
    pub const PERMANENT: i32 = -1;

    #[inline]
    pub fn is_permanent(&self) -> bool {
        self.duration == Self::PERMANENT
    }
}

/// Per-player effect ledger, at most one entry per effect id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            effects: ArrayVec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StatusEffect> {
        self.effects.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Stacks held for `id`, zero when absent.
    pub fn stacks(&self, id: &str) -> u32 {
        self.get(id).map_or(0, |e| e.stacks)
    }

    /// Inserts a new entry. Returns the effect back when the ledger is full.
    pub(crate) fn insert(&mut self, effect: StatusEffect) -> Result<(), StatusEffect> {
        self.effects.try_push(effect).map_err(|e| e.element())
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(index))
    }

    /// Effect ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.effects.iter().map(|e| e.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
