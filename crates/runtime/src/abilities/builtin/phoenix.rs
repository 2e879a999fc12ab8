use arena_core::{Event, EventKind, EventPayload};

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError, Scope};

const REVIVED: &str = "revived";

/// Comes back once per game with 1 HP.
///
/// The spent charge lives in a session variable rather than in the use
/// counter, so it survives cooldown resets and is restored by rollback.
pub struct Phoenix;

impl Ability for Phoenix {
    fn id(&self) -> &'static str {
        ids::PHOENIX
    }

    fn name(&self) -> &'static str {
        "Phoenix"
    }

    fn description(&self) -> &'static str {
        "Rise again with 1 HP the first time you fall."
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::Death]
    }

    fn on_event(&self, event: &mut Event, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let EventPayload::Death { victim, .. } = *event.payload() else {
            return Ok(());
        };
        if victim != ctx.owner() || ctx.get_var(Scope::Session, REVIVED, false) {
            return Ok(());
        }
        if ctx.roster().is_alive(victim) {
            return Ok(());
        }

        ctx.revive(victim, 1)?;
        ctx.set_var(Scope::Session, REVIVED, true);
        ctx.log(format!("{} rose from the ashes", ctx.owner_name()));
        Ok(())
    }
}
