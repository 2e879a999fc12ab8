use arena_core::{Event, EventKind};

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError};

/// Sends an incoming attack back at its attacker, twice per game.
pub struct Mirror;

impl Ability for Mirror {
    fn id(&self) -> &'static str {
        ids::MIRROR
    }

    fn name(&self) -> &'static str {
        "Mirror"
    }

    fn description(&self) -> &'static str {
        "Reflect an attack back at the attacker. Two charges."
    }

    fn priority(&self) -> i32 {
        10
    }

    fn max_uses(&self) -> Option<u32> {
        Some(2)
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::BeforeAttack]
    }

    fn on_event(&self, event: &mut Event, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let owner = ctx.owner();
        let Some(intent) = event.attack_intent() else {
            return Ok(());
        };
        if intent.target != owner || intent.attacker == owner || !ctx.instance().is_ready() {
            return Ok(());
        }
        let attacker = intent.attacker;

        if let Some(intent) = event.attack_intent_mut() {
            intent.target = attacker;
        }
        ctx.consume_use();
        let attacker_name = ctx.roster().name_of(attacker);
        ctx.log(format!(
            "{}'s Mirror turned the attack back on {attacker_name}",
            ctx.owner_name()
        ));
        Ok(())
    }
}
