//! Scripted scenarios.
//!
//! A scenario names the players, their optional overrides and abilities, and
//! the declarations for each turn, stored as RON:
//!
//! ```ron
//! (
//!     session_id: Some("duel"),
//!     seed: Some(7),
//!     players: [
//!         (name: "Ayla", ability: Some("mirror")),
//!         (name: "Bram", hp: Some(5), ability: Some("berserk")),
//!     ],
//!     turns: [
//!         [Attack("Ayla", "Bram"), Defend("Bram")],
//!         [Ability(actor: "Bram", target: Some("Ayla"))],
//!     ],
//! )
//! ```
//!
//! Living players without a declaration in a turn are filled in as `Pass`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use arena_core::{Action, GameConfig, Player, PlayerId, Roster};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default)]
    pub death_zone: Option<DeathZoneSpec>,

    pub players: Vec<PlayerSpec>,

    #[serde(default)]
    pub turns: Vec<Vec<ActionSpec>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathZoneSpec {
    pub start_turn: u32,
    pub interval: u32,
    pub damage_per_stage: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    #[serde(default)]
    pub hp: Option<i32>,
    #[serde(default)]
    pub attack: Option<i32>,
    #[serde(default)]
    pub defense_gauge: Option<u32>,
    #[serde(default)]
    pub ability: Option<String>,
}

/// One declaration, naming players by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionSpec {
    Attack(String, String),
    Defend(String),
    Evade(String),
    Pass(String),
    Ability {
        actor: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        ability: Option<String>,
    },
}

impl Scenario {
    /// Load scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse scenario: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content)?;
        if scenario.players.len() < 2 {
            bail!("a scenario needs at least two players");
        }
        Ok(scenario)
    }

    pub fn game_config(&self) -> GameConfig {
        let config = GameConfig::default();
        match &self.death_zone {
            Some(zone) => config.with_death_zone(zone.start_turn, zone.interval, zone.damage_per_stage),
            None => config,
        }
    }

    pub fn roster(&self, config: &GameConfig) -> Result<Roster> {
        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let mut player = Player::new(PlayerId(index as u32), spec.name.clone(), config);
                if let Some(hp) = spec.hp {
                    player = player.with_hp(hp, hp);
                }
                if let Some(attack) = spec.attack {
                    player = player.with_attack(attack);
                }
                if let Some(gauge) = spec.defense_gauge {
                    let max = gauge.max(config.default_max_defense_gauge);
                    player = player.with_defense_gauge(gauge, max);
                }
                player
            })
            .collect();
        Ok(Roster::new(players)?)
    }

    /// Abilities to bind, by player id.
    pub fn bindings(&self) -> Vec<(PlayerId, String)> {
        self.players
            .iter()
            .enumerate()
            .filter_map(|(index, spec)| {
                spec.ability
                    .clone()
                    .map(|ability| (PlayerId(index as u32), ability))
            })
            .collect()
    }

    /// Declarations for turn `index` (0-based) against the current roster.
    pub fn actions_for(&self, index: usize, roster: &Roster) -> Result<Vec<Action>> {
        let specs = self.turns.get(index).map(Vec::as_slice).unwrap_or_default();
        let mut actions = specs
            .iter()
            .map(|spec| resolve(spec, roster))
            .collect::<Result<Vec<_>>>()?;

        for id in roster.alive_ids() {
            if !actions.iter().any(|action| action.actor == id) {
                actions.push(Action::pass(id));
            }
        }
        Ok(actions)
    }
}

fn lookup(roster: &Roster, name: &str) -> Result<PlayerId> {
    match roster.iter().find(|p| p.name == name) {
        Some(player) => Ok(player.id),
        None => bail!("unknown player '{name}'"),
    }
}

fn resolve(spec: &ActionSpec, roster: &Roster) -> Result<Action> {
    let action = match spec {
        ActionSpec::Attack(actor, target) => {
            Action::attack(lookup(roster, actor)?, lookup(roster, target)?)
        }
        ActionSpec::Defend(actor) => Action::defend(lookup(roster, actor)?),
        ActionSpec::Evade(actor) => Action::evade(lookup(roster, actor)?),
        ActionSpec::Pass(actor) => Action::pass(lookup(roster, actor)?),
        ActionSpec::Ability {
            actor,
            target,
            ability,
        } => {
            let target = target
                .as_deref()
                .map(|name| lookup(roster, name))
                .transpose()?;
            let action = Action::ability(lookup(roster, actor)?, target);
            match ability {
                Some(id) => action.with_ability_id(id.clone()),
                None => action,
            }
        }
    };
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::ActionKind;

    const DUEL: &str = r#"(
        seed: Some(7),
        players: [
            (name: "Ayla", ability: Some("mirror")),
            (name: "Bram", hp: Some(5)),
            (name: "Cyd"),
        ],
        turns: [
            [Attack("Ayla", "Bram"), Defend("Bram")],
            [Ability(actor: "Bram", target: Some("Ayla"), ability: Some("berserk"))],
        ],
    )"#;

    #[test]
    fn parses_players_and_bindings() {
        let scenario = Scenario::parse(DUEL).unwrap();
        let config = scenario.game_config();
        let roster = scenario.roster(&config).unwrap();

        assert_eq!(scenario.seed, Some(7));
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.get(PlayerId(1)).unwrap().hp, 5);
        assert_eq!(scenario.bindings(), vec![(PlayerId(0), "mirror".to_string())]);
    }

    #[test]
    fn missing_declarations_become_pass() {
        let scenario = Scenario::parse(DUEL).unwrap();
        let roster = scenario.roster(&scenario.game_config()).unwrap();

        let first = scenario.actions_for(0, &roster).unwrap();
        assert_eq!(
            first,
            vec![
                Action::attack(PlayerId(0), PlayerId(1)),
                Action::defend(PlayerId(1)),
                Action::pass(PlayerId(2)),
            ]
        );

        let second = scenario.actions_for(1, &roster).unwrap();
        assert_eq!(second[0].kind, ActionKind::Ability);
        assert_eq!(second[0].ability_id.as_deref(), Some("berserk"));

        let beyond = scenario.actions_for(5, &roster).unwrap();
        assert!(beyond.iter().all(|a| a.kind == ActionKind::Pass));
        assert_eq!(beyond.len(), 3);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let scenario = Scenario::parse(
            r#"(players: [(name: "A"), (name: "B")], turns: [[Attack("A", "Zed")]])"#,
        )
        .unwrap();
        let roster = scenario.roster(&scenario.game_config()).unwrap();

        let err = scenario.actions_for(0, &roster).unwrap_err();
        assert!(err.to_string().contains("Zed"));
    }

    #[test]
    fn a_single_player_is_not_a_scenario() {
        assert!(Scenario::parse(r#"(players: [(name: "A")])"#).is_err());
    }
}
