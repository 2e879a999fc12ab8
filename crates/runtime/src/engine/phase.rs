use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Position of the turn engine inside one turn.
///
/// A turn walks the phases in declaration order and returns to `Idle`. An
/// engine found outside `Idle` on entry was aborted by a fatal error and must
/// be restored from a snapshot first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize,
)]
pub enum TurnPhase {
    #[default]
    Idle,
    TurnStart,
    DeclareDefend,
    DeclareEvade,
    ResolveAttacksAndAbilities,
    PerfectGuardCheck,
    StatusEffectTurnEnd,
    DeathZoneCheck,
    TurnEnd,
    CooldownUpdate,
}

impl TurnPhase {
    /// Fixed successor in the per-turn cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Idle => Self::TurnStart,
            Self::TurnStart => Self::DeclareDefend,
            Self::DeclareDefend => Self::DeclareEvade,
            Self::DeclareEvade => Self::ResolveAttacksAndAbilities,
            Self::ResolveAttacksAndAbilities => Self::PerfectGuardCheck,
            Self::PerfectGuardCheck => Self::StatusEffectTurnEnd,
            Self::StatusEffectTurnEnd => Self::DeathZoneCheck,
            Self::DeathZoneCheck => Self::TurnEnd,
            Self::TurnEnd => Self::CooldownUpdate,
            Self::CooldownUpdate => Self::Idle,
        }
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_returns_to_idle_after_ten_steps() {
        let mut phase = TurnPhase::Idle;
        let mut seen = Vec::new();
        loop {
            phase = phase.next();
            seen.push(phase);
            if phase.is_idle() {
                break;
            }
        }
        assert_eq!(seen.len(), 10);
        assert_eq!(seen[0], TurnPhase::TurnStart);
        assert_eq!(seen[8], TurnPhase::CooldownUpdate);
    }
}
