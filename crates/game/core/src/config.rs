/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Starting (and maximum) HP for players built with [`crate::Player::new`].
    pub default_max_hp: i32,
    /// Starting (and maximum) defense gauge.
    pub default_max_defense_gauge: u32,
    /// Raw damage of a plain attack.
    pub default_attack: i32,

    /// Consecutive turns attacking the same target before a focus attack fires.
    pub focus_attack_threshold: u32,
    /// Raw damage added by a focus attack.
    pub focus_attack_bonus: i32,

    /// Last turn before the death zone becomes active.
    pub death_zone_start_turn: u32,
    /// The death zone escalates on every turn that is a multiple of this value.
    pub death_zone_interval: u32,
    /// Flat HP loss per death zone stage.
    pub death_zone_damage_per_stage: i32,

    /// Evade chance contributed by each living player, in percent.
    pub evade_chance_per_player: u32,

    /// Crack stacks required to trigger the crack burst.
    pub crack_threshold: u32,
    /// Damage dealt by a crack burst.
    pub crack_damage: i32,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_PLAYERS: usize = 16;
    pub const MAX_STATUS_EFFECTS: usize = 12;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_HP: i32 = 3;
    pub const DEFAULT_MAX_DEFENSE_GAUGE: u32 = 3;
    pub const DEFAULT_ATTACK: i32 = 1;
    pub const DEFAULT_FOCUS_ATTACK_THRESHOLD: u32 = 3;
    pub const DEFAULT_FOCUS_ATTACK_BONUS: i32 = 2;
    pub const DEFAULT_DEATH_ZONE_START_TURN: u32 = 20;
    pub const DEFAULT_DEATH_ZONE_INTERVAL: u32 = 5;
    pub const DEFAULT_DEATH_ZONE_DAMAGE_PER_STAGE: i32 = 1;
    pub const DEFAULT_EVADE_CHANCE_PER_PLAYER: u32 = 5;
    pub const DEFAULT_CRACK_THRESHOLD: u32 = 3;
    pub const DEFAULT_CRACK_DAMAGE: i32 = 1;

    pub fn new() -> Self {
        Self {
            default_max_hp: Self::DEFAULT_MAX_HP,
            default_max_defense_gauge: Self::DEFAULT_MAX_DEFENSE_GAUGE,
            default_attack: Self::DEFAULT_ATTACK,
            focus_attack_threshold: Self::DEFAULT_FOCUS_ATTACK_THRESHOLD,
            focus_attack_bonus: Self::DEFAULT_FOCUS_ATTACK_BONUS,
            death_zone_start_turn: Self::DEFAULT_DEATH_ZONE_START_TURN,
            death_zone_interval: Self::DEFAULT_DEATH_ZONE_INTERVAL,
            death_zone_damage_per_stage: Self::DEFAULT_DEATH_ZONE_DAMAGE_PER_STAGE,
            evade_chance_per_player: Self::DEFAULT_EVADE_CHANCE_PER_PLAYER,
            crack_threshold: Self::DEFAULT_CRACK_THRESHOLD,
            crack_damage: Self::DEFAULT_CRACK_DAMAGE,
        }
    }

    pub fn with_death_zone(mut self, start_turn: u32, interval: u32, damage_per_stage: i32) -> Self {
        self.death_zone_start_turn = start_turn;
        self.death_zone_interval = interval.max(1);
        self.death_zone_damage_per_stage = damage_per_stage;
        self
    }

    pub fn with_focus_attack(mut self, threshold: u32, bonus: i32) -> Self {
        self.focus_attack_threshold = threshold.max(1);
        self.focus_attack_bonus = bonus;
        self
    }

    pub fn with_evade_chance_per_player(mut self, percent: u32) -> Self {
        self.evade_chance_per_player = percent;
        self
    }

    /// Returns true once the turn counter has passed the death zone threshold.
    pub fn is_death_zone(&self, turn: u32) -> bool {
        turn > self.death_zone_start_turn
    }

    /// Returns true when `turn` escalates the death zone by one stage.
    pub fn is_death_zone_escalation(&self, turn: u32) -> bool {
        self.is_death_zone(turn) && turn % self.death_zone_interval.max(1) == 0
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn death_zone_escalates_only_on_multiples_past_threshold() {
        let config = GameConfig::new().with_death_zone(10, 5, 1);

        assert!(!config.is_death_zone(10));
        assert!(config.is_death_zone(11));
        assert!(!config.is_death_zone_escalation(10));
        assert!(!config.is_death_zone_escalation(12));
        assert!(config.is_death_zone_escalation(15));
        assert!(config.is_death_zone_escalation(20));
    }

    #[test]
    fn interval_is_never_zero() {
        let config = GameConfig::new().with_death_zone(0, 0, 1);
        assert_eq!(config.death_zone_interval, 1);
        assert!(config.is_death_zone_escalation(1));
    }
}
