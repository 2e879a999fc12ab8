use arena_core::{Event, EventKind, EventPayload};

use super::ids;
use crate::abilities::{Ability, AbilityContext, AbilityError, Scope};

const WINS: &str = "wins";

/// Remembers wins across sessions and greets the arena with the tally.
pub struct Veteran;

impl Ability for Veteran {
    fn id(&self) -> &'static str {
        ids::VETERAN
    }

    fn name(&self) -> &'static str {
        "Veteran"
    }

    fn description(&self) -> &'static str {
        "Counts victories across every game played."
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::GameStart, EventKind::GameEnd]
    }

    fn on_event(&self, event: &mut Event, ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        let wins: u32 = ctx.get_var(Scope::Permanent, WINS, 0);
        match *event.payload() {
            EventPayload::GameStart { .. } if wins > 0 => {
                ctx.log(format!("{} enters with {wins} past win(s)", ctx.owner_name()));
            }
            EventPayload::GameEnd {
                winner: Some(winner),
                ..
            } if winner == ctx.owner() => {
                ctx.set_var(Scope::Permanent, WINS, wins + 1);
            }
            _ => {}
        }
        Ok(())
    }
}
