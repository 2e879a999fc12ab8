use std::fmt;

use arena_core::PlayerId;
use serde::{Deserialize, Serialize};

use super::scope::ScopedVars;

/// Why an ability cannot be used right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotReady {
    Disabled,
    Exhausted,
    Cooldown(u32),
    /// Ability-specific condition.
    Other(String),
}

impl fmt::Display for NotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("ability is disabled"),
            Self::Exhausted => f.write_str("no uses left"),
            Self::Cooldown(turns) => write!(f, "on cooldown for {turns} more turn(s)"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// Runtime state of one ability bound to one player.
///
/// `remaining_uses` and `cooldown` are independent gates: both must allow a
/// use. `None` uses means unlimited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityInstance {
    pub ability_id: String,
    pub owner: PlayerId,
    pub priority: i32,
    pub cooldown: u32,
    pub max_cooldown: u32,
    pub remaining_uses: Option<u32>,
    pub is_active: bool,
    pub error_count: u32,
    pub vars: ScopedVars,
}

impl AbilityInstance {
    pub fn new(
        ability_id: impl Into<String>,
        owner: PlayerId,
        priority: i32,
        max_cooldown: u32,
        max_uses: Option<u32>,
    ) -> Self {
        Self {
            ability_id: ability_id.into(),
            owner,
            priority,
            cooldown: 0,
            max_cooldown,
            remaining_uses: max_uses,
            is_active: true,
            error_count: 0,
            vars: ScopedVars::new(),
        }
    }

    /// Default gate: active, uses left, cooldown elapsed.
    pub fn readiness(&self) -> Result<(), NotReady> {
        if !self.is_active {
            return Err(NotReady::Disabled);
        }
        if self.remaining_uses == Some(0) {
            return Err(NotReady::Exhausted);
        }
        if self.cooldown > 0 {
            return Err(NotReady::Cooldown(self.cooldown));
        }
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_ok()
    }

    /// Spends one use and starts the cooldown.
    pub fn consume_use(&mut self) {
        if let Some(uses) = self.remaining_uses.as_mut() {
            *uses = uses.saturating_sub(1);
        }
        self.cooldown = self.max_cooldown;
    }

    pub fn tick_cooldown(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Storage key for the permanent variable tier.
    pub fn permanent_key(&self) -> String {
        format!("vars/{}/{}", self.ability_id, self.owner.0)
    }
}
