//! Pure combat formulas.

/// Evade success chance in percent.
///
/// `clamp(per_player * (alive_count - 2 * evade_count), 0, 100)`: more players
/// alive makes evading easier, every stored evade makes it harder.
pub fn evade_chance(alive_count: usize, evade_count: u32, per_player: u32) -> u32 {
    let raw = per_player as i64 * (alive_count as i64 - 2 * evade_count as i64);
    raw.clamp(0, 100) as u32
}

/// True when a d100 roll (1-100) lands inside `chance`.
pub fn roll_succeeds(roll: u32, chance: u32) -> bool {
    chance > 0 && roll <= chance
}
