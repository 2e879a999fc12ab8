use arena_core::{Event, EventKind, TurnFlags};

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError};

/// Once per game, reduces an incoming attack's damage to zero.
///
/// Skipped when the owner is already defending, so the single charge is not
/// wasted on an attack the gauge would stop anyway.
pub struct IronWill;

impl Ability for IronWill {
    fn id(&self) -> &'static str {
        ids::IRON_WILL
    }

    fn name(&self) -> &'static str {
        "Iron Will"
    }

    fn description(&self) -> &'static str {
        "Once per game, shrug off an attack completely."
    }

    fn priority(&self) -> i32 {
        5
    }

    fn max_uses(&self) -> Option<u32> {
        Some(1)
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::BeforeAttack]
    }

    fn on_event(&self, event: &mut Event, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let owner = ctx.owner();
        let Some(intent) = event.attack_intent() else {
            return Ok(());
        };
        if intent.target != owner || intent.damage <= 0 || !ctx.instance().is_ready() {
            return Ok(());
        }
        let defending = ctx
            .player(owner)
            .is_some_and(|p| p.has_flag(TurnFlags::HAS_DEFENDED));
        if defending && !intent.ignore_defense {
            return Ok(());
        }

        if let Some(intent) = event.attack_intent_mut() {
            intent.damage = 0;
        }
        ctx.consume_use();
        ctx.log(format!("{}'s Iron Will absorbed the blow", ctx.owner_name()));
        Ok(())
    }
}
