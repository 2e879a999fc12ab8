use arena_core::{Action, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Everything the presentation and records collaborators need from a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn_number: u32,
    /// Declarations that passed validation, in resolution input order.
    pub actions: Vec<Action>,
    pub logs: Vec<String>,
    pub players: Vec<Player>,
    pub is_death_zone: bool,
    pub game_over: bool,
    pub winner: Option<PlayerId>,
}

impl TurnResult {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }
}
