use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError, AbilityOutcome, AbilityParams};

const DAMAGE: i32 = 2;

/// Active strike for heavy damage. Two uses, two-turn cooldown.
pub struct Berserk;

impl Ability for Berserk {
    fn id(&self) -> &'static str {
        ids::BERSERK
    }

    fn name(&self) -> &'static str {
        "Berserk"
    }

    fn description(&self) -> &'static str {
        "Deal 2 damage to a target."
    }

    fn max_cooldown(&self) -> u32 {
        2
    }

    fn max_uses(&self) -> Option<u32> {
        Some(2)
    }

    fn execute(
        &self,
        ctx: &mut AbilityContext<'_>,
        params: &AbilityParams,
    ) -> Result<AbilityOutcome, AbilityError> {
        let Some(target) = params.target else {
            return Ok(AbilityOutcome::failure("Berserk needs a target"));
        };
        if target == params.actor || !ctx.roster().is_alive(target) {
            return Ok(AbilityOutcome::failure("Berserk needs a living opponent"));
        }
        let target_name = ctx.roster().name_of(target);
        Ok(AbilityOutcome::success(format!(
            "{} went berserk on {target_name}",
            ctx.owner_name()
        ))
        .with_damage(DAMAGE)
        .with_target(target))
    }
}
