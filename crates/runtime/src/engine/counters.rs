use arena_core::PlayerId;
use serde::{Deserialize, Serialize};

/// Consecutive-turn attack streak of one attacker against one target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStreak {
    pub attacker: PlayerId,
    pub target: PlayerId,
    pub count: u32,
    pub last_turn: u32,
}

/// Engine-owned counters that are part of game truth and therefore snapshotted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCounters {
    /// Last completed (or in-flight) turn number. Zero before the first turn.
    pub turn: u32,
    pub death_zone_stage: u32,
    pub(crate) focus: Vec<FocusStreak>,
}

impl EngineCounters {
    /// Records that `attacker` attacks `target` on `turn` and returns the
    /// updated streak length. A gap of a turn or a change of target restarts
    /// the streak at one.
    pub fn record_attack(&mut self, attacker: PlayerId, target: PlayerId, turn: u32) -> u32 {
        let index = match self.focus.iter().position(|s| s.attacker == attacker) {
            Some(index) => index,
            None => {
                self.focus.push(FocusStreak {
                    attacker,
                    target,
                    count: 0,
                    last_turn: 0,
                });
                self.focus.len() - 1
            }
        };
        let streak = &mut self.focus[index];

        let continues = streak.target == target && streak.last_turn + 1 == turn;
        streak.count = if continues { streak.count + 1 } else { 1 };
        streak.target = target;
        streak.last_turn = turn;
        streak.count
    }

    /// Clears an attacker's streak after the focus bonus fired.
    pub fn reset_focus(&mut self, attacker: PlayerId) {
        if let Some(streak) = self.focus.iter_mut().find(|s| s.attacker == attacker) {
            streak.count = 0;
        }
    }

    pub fn focus_streak(&self, attacker: PlayerId) -> Option<&FocusStreak> {
        self.focus.iter().find(|s| s.attacker == attacker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    #[test]
    fn streak_grows_on_consecutive_turns() {
        let mut counters = EngineCounters::default();
        assert_eq!(counters.record_attack(A, B, 1), 1);
        assert_eq!(counters.record_attack(A, B, 2), 2);
        assert_eq!(counters.record_attack(A, B, 3), 3);
    }

    #[test]
    fn gap_or_new_target_restarts() {
        let mut counters = EngineCounters::default();
        counters.record_attack(A, B, 1);
        counters.record_attack(A, B, 2);
        assert_eq!(counters.record_attack(A, B, 4), 1);
        assert_eq!(counters.record_attack(A, C, 5), 1);
        assert_eq!(counters.focus_streak(A).unwrap().target, C);
    }

    #[test]
    fn reset_starts_over_on_the_next_turn() {
        let mut counters = EngineCounters::default();
        for turn in 1..=3 {
            counters.record_attack(A, B, turn);
        }
        counters.reset_focus(A);
        assert_eq!(counters.record_attack(A, B, 4), 1);
    }
}
