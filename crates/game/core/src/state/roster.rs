use super::{Player, PlayerId, RosterError};
use crate::config::GameConfig;

/// The single authoritative collection of players for one game.
///
/// Players are stored densely: `players[i].id == PlayerId(i)`. Subsystems hold
/// `PlayerId`s, never references or copies, so there is exactly one place where
/// HP, gauges and effects live.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Builds a roster, checking that ids are dense and ordered.
    pub fn new(players: Vec<Player>) -> Result<Self, RosterError> {
        if players.len() > GameConfig::MAX_PLAYERS {
            return Err(RosterError::TooManyPlayers {
                count: players.len(),
                max: GameConfig::MAX_PLAYERS,
            });
        }
        for (index, player) in players.iter().enumerate() {
            if player.id.index() != index {
                return Err(RosterError::NonDenseId {
                    expected: PlayerId(index as u32),
                    found: player.id,
                });
            }
        }
        Ok(Self { players })
    }

    /// Convenience constructor assigning ids in order.
    pub fn from_names<I, S>(names: I, config: &GameConfig) -> Result<Self, RosterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let players = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Player::new(PlayerId(index as u32), name, config))
            .collect();
        Self::new(players)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        id.index() < self.players.len()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index())
    }

    pub fn require(&self, id: PlayerId) -> Result<&Player, RosterError> {
        self.get(id).ok_or(RosterError::UnknownPlayer(id))
    }

    pub fn require_mut(&mut self, id: PlayerId) -> Result<&mut Player, RosterError> {
        self.get_mut(id).ok_or(RosterError::UnknownPlayer(id))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.alive().map(|p| p.id).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.get(id).is_some_and(Player::is_alive)
    }

    /// Display name for log lines; unknown ids render as their numeric form.
    pub fn name_of(&self, id: PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Last player standing, if exactly one remains.
    pub fn winner(&self) -> Option<PlayerId> {
        let mut alive = self.alive();
        match (alive.next(), alive.next()) {
            (Some(last), None) => Some(last.id),
            _ => None,
        }
    }

    pub fn revive(&mut self, id: PlayerId, hp: i32) -> Result<(), RosterError> {
        let player = self.require_mut(id)?;
        if player.is_alive() {
            return Err(RosterError::NotDead(id));
        }
        player.revive(hp);
        Ok(())
    }

    /// Verifies the gauge and stack invariants for every player.
    pub fn check_invariants(&self) -> Result<(), RosterError> {
        for player in &self.players {
            if player.defense_gauge > player.max_defense_gauge {
                return Err(RosterError::GaugeOverflow {
                    player: player.id,
                    gauge: player.defense_gauge,
                    max: player.max_defense_gauge,
                });
            }
            for effect in player.status_effects.iter() {
                if effect.stacks > effect.max_stacks {
                    return Err(RosterError::StacksOverflow {
                        player: player.id,
                        effect: effect.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_sparse_ids() {
        let config = GameConfig::default();
        let players = vec![
            Player::new(PlayerId(0), "a", &config),
            Player::new(PlayerId(2), "b", &config),
        ];
        assert!(matches!(
            Roster::new(players),
            Err(RosterError::NonDenseId { .. })
        ));
    }

    #[test]
    fn winner_requires_a_single_survivor() {
        let config = GameConfig::default();
        let mut roster = Roster::from_names(["a", "b", "c"], &config).unwrap();
        assert_eq!(roster.winner(), None);

        roster.get_mut(PlayerId(0)).unwrap().mark_dead(None);
        assert_eq!(roster.winner(), None);

        roster.get_mut(PlayerId(2)).unwrap().mark_dead(None);
        assert_eq!(roster.winner(), Some(PlayerId(1)));
    }

    #[test]
    fn revive_only_applies_to_the_dead() {
        let config = GameConfig::default();
        let mut roster = Roster::from_names(["a", "b"], &config).unwrap();
        assert!(matches!(
            roster.revive(PlayerId(0), 1),
            Err(RosterError::NotDead(_))
        ));

        roster.get_mut(PlayerId(0)).unwrap().mark_dead(Some(PlayerId(1)));
        roster.revive(PlayerId(0), 2).unwrap();
        assert!(roster.is_alive(PlayerId(0)));
    }

    #[test]
    fn invariant_check_catches_gauge_overflow() {
        let config = GameConfig::default();
        let mut roster = Roster::from_names(["a"], &config).unwrap();
        roster.get_mut(PlayerId(0)).unwrap().defense_gauge = 99;
        assert!(matches!(
            roster.check_invariants(),
            Err(RosterError::GaugeOverflow { .. })
        ));
    }
}
