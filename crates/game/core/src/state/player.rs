use std::fmt;

use bitflags::bitflags;

use super::RosterError;
use crate::config::GameConfig;
use crate::status::StatusEffects;

/// Stable index of a player inside the [`super::Roster`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PlayerId(pub u32);

impl PlayerId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse life state of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerStatus {
    #[default]
    Alive,
    /// Alive with half or less of maximum HP.
    Wounded,
    Dead,
}

bitflags! {
    /// Scratch flags consulted while a turn resolves.
    ///
    /// The per-turn subset ([`TurnFlags::PER_TURN`]) is cleared at turn start;
    /// seal flags are owned by the status effects that set them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TurnFlags: u8 {
        const WAS_ATTACKED = 0b0000_0001;
        const HAS_DEFENDED = 0b0000_0010;
        const EVADING = 0b0000_0100;
        const ABILITY_SEALED = 0b0000_1000;
        const DEFENSE_SEALED = 0b0001_0000;
    }
}

impl TurnFlags {
    pub const PER_TURN: Self = Self::WAS_ATTACKED
        .union(Self::HAS_DEFENDED)
        .union(Self::EVADING);
}

/// Complete combat state of one participant.
///
/// # Invariants
///
/// - `defense_gauge <= max_defense_gauge`
/// - every held status effect has `stacks <= max_stacks`
/// - `status == Dead` iff the engine declared the player dead; HP alone
///   never flips the status, so simultaneous attacks resolve consistently
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    pub hp: i32,
    pub max_hp: i32,
    /// Raw damage dealt by a plain attack.
    pub attack: i32,

    pub defense_gauge: u32,
    pub max_defense_gauge: u32,
    /// Grows when declaring Evade, shrinks when attacking.
    pub evade_count: u32,

    pub status: PlayerStatus,
    /// Identifier of the ability bound to this player, if any.
    pub ability_id: Option<String>,
    pub status_effects: StatusEffects,
    pub flags: TurnFlags,

    /// Player credited with the kill. `None` while alive or for environmental deaths.
    pub killed_by: Option<PlayerId>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, config: &GameConfig) -> Self {
        Self {
            id,
            name: name.into(),
            hp: config.default_max_hp,
            max_hp: config.default_max_hp,
            attack: config.default_attack,
            defense_gauge: config.default_max_defense_gauge,
            max_defense_gauge: config.default_max_defense_gauge,
            evade_count: 0,
            status: PlayerStatus::Alive,
            ability_id: None,
            status_effects: StatusEffects::empty(),
            flags: TurnFlags::empty(),
            killed_by: None,
        }
    }

    pub fn with_hp(mut self, hp: i32, max_hp: i32) -> Self {
        self.max_hp = max_hp;
        self.hp = hp.min(max_hp);
        self.refresh_status();
        self
    }

    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_defense_gauge(mut self, gauge: u32, max_gauge: u32) -> Self {
        self.max_defense_gauge = max_gauge;
        self.defense_gauge = gauge.min(max_gauge);
        self
    }

    pub fn with_evade_count(mut self, evade_count: u32) -> Self {
        self.evade_count = evade_count;
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status != PlayerStatus::Dead
    }

    #[inline]
    pub fn has_flag(&self, flag: TurnFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_ability_sealed(&self) -> bool {
        self.has_flag(TurnFlags::ABILITY_SEALED)
    }

    pub fn is_defense_sealed(&self) -> bool {
        self.has_flag(TurnFlags::DEFENSE_SEALED)
    }

    /// Subtracts HP and returns the amount actually removed.
    ///
    /// Does not declare death; callers check `hp <= 0` and call [`Player::mark_dead`].
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.max(0);
        self.hp -= dealt;
        self.refresh_status();
        dealt
    }

    /// Restores HP up to `max_hp` and returns the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() || amount <= 0 {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.refresh_status();
        self.hp - before
    }

    /// Consumes one defense gauge point.
    pub fn spend_defense(&mut self) -> Result<(), RosterError> {
        if self.defense_gauge == 0 {
            return Err(RosterError::GaugeUnderflow { player: self.id });
        }
        self.defense_gauge -= 1;
        Ok(())
    }

    /// Grants one defense gauge point if there is spare capacity.
    pub fn gain_defense(&mut self) -> bool {
        if self.defense_gauge >= self.max_defense_gauge {
            return false;
        }
        self.defense_gauge += 1;
        true
    }

    pub fn mark_dead(&mut self, killer: Option<PlayerId>) {
        self.status = PlayerStatus::Dead;
        self.killed_by = killer;
        self.flags.remove(TurnFlags::PER_TURN);
    }

    /// Brings a dead player back with `hp` (at least 1), clearing every held effect.
    pub fn revive(&mut self, hp: i32) {
        self.hp = hp.clamp(1, self.max_hp.max(1));
        self.status = PlayerStatus::Alive;
        self.killed_by = None;
        self.status_effects = StatusEffects::empty();
        self.flags = TurnFlags::empty();
        self.refresh_status();
    }

    /// Recomputes Alive/Wounded from current HP. Dead stays dead.
    pub fn refresh_status(&mut self) {
        if self.status == PlayerStatus::Dead {
            return;
        }
        self.status = if self.hp * 2 <= self.max_hp {
            PlayerStatus::Wounded
        } else {
            PlayerStatus::Alive
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(PlayerId(0), "Ada", &GameConfig::default())
    }

    #[test]
    fn damage_marks_wounded_but_never_dead() {
        let mut p = player().with_hp(4, 4);
        assert_eq!(p.take_damage(2), 2);
        assert_eq!(p.status, PlayerStatus::Wounded);

        p.take_damage(5);
        assert!(p.hp < 0);
        assert!(p.is_alive(), "only the engine declares death");
    }

    #[test]
    fn negative_damage_is_ignored() {
        let mut p = player();
        assert_eq!(p.take_damage(-3), 0);
        assert_eq!(p.hp, p.max_hp);
    }

    #[test]
    fn heal_caps_at_max_and_skips_the_dead() {
        let mut p = player().with_hp(1, 3);
        assert_eq!(p.heal(10), 2);
        assert_eq!(p.status, PlayerStatus::Alive);

        p.mark_dead(None);
        assert_eq!(p.heal(1), 0);
    }

    #[test]
    fn gauge_stays_within_bounds() {
        let mut p = player().with_defense_gauge(1, 2);
        assert!(p.spend_defense().is_ok());
        assert!(p.spend_defense().is_err());
        assert_eq!(p.defense_gauge, 0);

        assert!(p.gain_defense());
        assert!(p.gain_defense());
        assert!(!p.gain_defense());
        assert_eq!(p.defense_gauge, 2);
    }

    #[test]
    fn revive_resets_kill_credit() {
        let mut p = player();
        p.take_damage(5);
        p.mark_dead(Some(PlayerId(3)));
        assert_eq!(p.killed_by, Some(PlayerId(3)));

        p.revive(1);
        assert!(p.is_alive());
        assert_eq!(p.hp, 1);
        assert_eq!(p.killed_by, None);
        assert_eq!(p.status, PlayerStatus::Wounded);
    }
}
