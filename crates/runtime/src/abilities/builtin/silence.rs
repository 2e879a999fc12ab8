use arena_core::effect_ids;

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError, AbilityOutcome, AbilityParams};

const SEAL_TURNS: i32 = 2;

/// Seals a target's ability for two turns.
pub struct Silence;

impl Ability for Silence {
    fn id(&self) -> &'static str {
        ids::SILENCE
    }

    fn name(&self) -> &'static str {
        "Silence"
    }

    fn description(&self) -> &'static str {
        "Seal a target's ability for 2 turns."
    }

    fn max_cooldown(&self) -> u32 {
        3
    }

    fn execute(
        &self,
        ctx: &mut AbilityContext<'_>,
        params: &AbilityParams,
    ) -> Result<AbilityOutcome, AbilityError> {
        let Some(target) = params.target.filter(|&t| t != params.actor) else {
            return Ok(AbilityOutcome::failure("Silence needs another player as target"));
        };
        if !ctx.roster().is_alive(target) {
            return Ok(AbilityOutcome::failure("Silence needs a living target"));
        }

        ctx.apply_status(target, effect_ids::ABILITY_SEAL, SEAL_TURNS, 1)?;
        let target_name = ctx.roster().name_of(target);
        Ok(AbilityOutcome::success(format!(
            "{} silenced {target_name}",
            ctx.owner_name()
        ))
        .with_target(target))
    }
}
