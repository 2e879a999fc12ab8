use arena_core::{Event, EventKind, EventPayload, effect_ids};

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError};

const SPARKS: &str = "sparks";
const SPARKS_PER_TURN: u32 = 1;

/// After landing an attack, cracks the target and announces the chain.
///
/// Fires at most once per turn; the counter is turn-scoped.
pub struct ChainSpark;

impl Ability for ChainSpark {
    fn id(&self) -> &'static str {
        ids::CHAIN_SPARK
    }

    fn name(&self) -> &'static str {
        "Chain Spark"
    }

    fn description(&self) -> &'static str {
        "Hits add a crack stack to the target, once per turn."
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::AfterAttack]
    }

    fn on_event(&self, event: &mut Event, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let EventPayload::AfterAttack {
            attacker,
            target,
            damage,
            ..
        } = *event.payload()
        else {
            return Ok(());
        };
        let standing = ctx
            .roster()
            .get(target)
            .is_some_and(|p| p.is_alive() && p.hp > 0);
        if attacker != ctx.owner() || damage <= 0 || !standing {
            return Ok(());
        }
        let turn = ctx.this_turn();
        let sparks: u32 = ctx.get_var(turn, SPARKS, 0);
        if sparks >= SPARKS_PER_TURN {
            return Ok(());
        }

        ctx.set_var(turn, SPARKS, sparks + 1);
        ctx.apply_status(target, effect_ids::CRACK, -1, 1)?;
        ctx.emit(EventPayload::AbilityChainTriggered {
            source: ids::CHAIN_SPARK.to_string(),
            owner: ctx.owner(),
            target: Some(target),
        });
        Ok(())
    }
}
