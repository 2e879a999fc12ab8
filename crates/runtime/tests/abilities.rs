use std::sync::Arc;

use arena_core::{
    Action, Event, EventKind, GameConfig, Player, PlayerId, PlayerStatus, Roster,
    StatusEffectEngine, effect_ids,
};
use arena_runtime::abilities::builtin::ids;
use arena_runtime::{
    Ability, AbilityContext, AbilityError, AbilityOutcome, AbilityParams, AbilityRegistry,
    AbilityRuntime, TurnEngine, TurnPhase,
};

const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);

fn players(config: &GameConfig) -> Vec<Player> {
    vec![Player::new(A, "A", config), Player::new(B, "B", config)]
}

fn engine(players: Vec<Player>, bindings: &[(PlayerId, &str)]) -> TurnEngine {
    let mut engine = TurnEngine::new(GameConfig::default(), Roster::new(players).unwrap(), 7);
    for (owner, id) in bindings {
        engine.bind_ability(*owner, id).unwrap();
    }
    engine
}

#[test]
fn mirror_sends_the_attack_back() {
    let config = GameConfig::default();
    let roster = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_defense_gauge(2, 3),
    ];
    let mut engine = engine(roster, &[(B, ids::MIRROR)]);

    let result = engine.process_turn(&[Action::attack(A, B)]).unwrap();

    assert_eq!(result.player(A).unwrap().hp, 2);
    assert_eq!(result.player(B).unwrap().hp, 3);
    assert_eq!(result.player(B).unwrap().defense_gauge, 3, "perfect guard");
    assert_eq!(engine.abilities().instance(B).unwrap().remaining_uses, Some(1));
    assert!(result.logs.iter().any(|l| l.contains("Mirror turned the attack back on A")));
}

#[test]
fn iron_will_absorbs_one_attack_per_game() {
    let config = GameConfig::default();
    let mut engine = engine(players(&config), &[(B, ids::IRON_WILL)]);

    let first = engine.process_turn(&[Action::attack(A, B)]).unwrap();
    assert_eq!(first.player(B).unwrap().hp, 3);

    let second = engine.process_turn(&[Action::attack(A, B)]).unwrap();
    assert_eq!(second.player(B).unwrap().hp, 2);
}

#[test]
fn berserk_strikes_then_waits_out_its_cooldown() {
    let config = GameConfig::default();
    let mut engine = engine(players(&config), &[(A, ids::BERSERK)]);

    let first = engine.process_turn(&[Action::ability(A, Some(B))]).unwrap();
    assert_eq!(first.player(B).unwrap().hp, 1);
    let instance = engine.abilities().instance(A).unwrap();
    assert_eq!(instance.remaining_uses, Some(1));
    assert_eq!(instance.cooldown, 1);

    let second = engine.process_turn(&[Action::ability(A, Some(B))]).unwrap();
    assert_eq!(second.player(B).unwrap().hp, 1);
    assert_eq!(engine.abilities().instance(A).unwrap().remaining_uses, Some(1));

    let third = engine.process_turn(&[Action::ability(A, Some(B))]).unwrap();
    let b = third.player(B).unwrap();
    assert_eq!(b.status, PlayerStatus::Dead);
    assert_eq!(b.killed_by, Some(A));
}

#[test]
fn an_exhausted_ability_changes_nothing() {
    let config = GameConfig::default();
    let mut engine = engine(players(&config), &[(A, ids::BERSERK)]);
    engine
        .abilities_mut()
        .instance_mut(A)
        .unwrap()
        .remaining_uses = Some(0);
    let before = engine.abilities().instance(A).unwrap().clone();

    let result = engine.process_turn(&[Action::ability(A, Some(B))]).unwrap();

    assert_eq!(result.player(B).unwrap().hp, 3);
    assert_eq!(engine.abilities().instance(A).unwrap(), &before);
    assert!(result.logs.iter().any(|l| l.contains("Berserk")));
}

#[test]
fn silence_seals_the_target_for_two_turns() {
    let config = GameConfig::default();
    let mut engine = engine(
        players(&config),
        &[(A, ids::SILENCE), (B, ids::BERSERK)],
    );

    let first = engine
        .process_turn(&[Action::ability(A, Some(B)), Action::ability(B, Some(A))])
        .unwrap();
    assert_eq!(first.player(A).unwrap().hp, 3);
    assert!(first.logs.iter().any(|l| l == "B's ability is sealed"));

    let second = engine.process_turn(&[Action::ability(B, Some(A))]).unwrap();
    assert_eq!(second.player(A).unwrap().hp, 3);
    assert!(
        !second
            .player(B)
            .unwrap()
            .status_effects
            .contains(effect_ids::ABILITY_SEAL)
    );

    let third = engine.process_turn(&[Action::ability(B, Some(A))]).unwrap();
    assert_eq!(third.player(A).unwrap().hp, 1);
}

#[test]
fn phoenix_revives_its_owner_once() {
    let config = GameConfig::default();
    let roster = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_hp(1, 3),
    ];
    let mut engine = engine(roster, &[(B, ids::PHOENIX)]);

    let first = engine.process_turn(&[Action::attack(A, B)]).unwrap();
    let b = first.player(B).unwrap();
    assert!(b.is_alive());
    assert_eq!(b.hp, 1);
    assert!(first.logs.iter().any(|l| l == "B was defeated by A"));
    assert!(first.logs.iter().any(|l| l == "B rose from the ashes"));

    let second = engine.process_turn(&[Action::attack(A, B)]).unwrap();
    assert_eq!(second.player(B).unwrap().status, PlayerStatus::Dead);
    assert_eq!(second.winner, Some(A));
}

#[test]
fn chain_spark_cracks_the_target_until_it_bursts() {
    let config = GameConfig::default();
    let roster = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_hp(10, 10),
    ];
    let mut engine = engine(roster, &[(A, ids::CHAIN_SPARK)]);

    for _ in 0..3 {
        engine.process_turn(&[Action::attack(A, B)]).unwrap();
    }

    let b = engine.roster().get(B).unwrap();
    // 1 + 1 + (1 + focus bonus 2), then the crack burst.
    assert_eq!(b.hp, 10 - 5 - 1);
    assert!(!b.status_effects.contains(effect_ids::CRACK));
    let chained = engine
        .history()
        .iter()
        .filter(|e| e.kind() == EventKind::AbilityChainTriggered)
        .count();
    assert_eq!(chained, 3);
    assert!(!engine.abilities().instance(A).unwrap().vars.has_turn_vars());
}

struct Unstable;

impl Ability for Unstable {
    fn id(&self) -> &'static str {
        "unstable"
    }

    fn name(&self) -> &'static str {
        "Unstable"
    }

    fn hooks(&self) -> &'static [EventKind] {
        &[EventKind::TurnStart]
    }

    fn on_event(&self, _event: &mut Event, _ctx: &mut AbilityContext<'_>) -> Result<(), AbilityError> {
        Err(AbilityError::Script("unstable hook".into()))
    }
}

#[test]
fn a_faulty_ability_is_disabled_without_stopping_the_game() {
    let config = GameConfig::default();
    let mut registry = AbilityRegistry::builtin();
    registry.register(Arc::new(Unstable));
    let mut engine = TurnEngine::with_parts(
        config.clone(),
        Roster::new(vec![
            Player::new(A, "A", &config),
            Player::new(B, "B", &config).with_hp(10, 10),
        ])
        .unwrap(),
        7,
        StatusEffectEngine::builtin(config.clone()),
        AbilityRuntime::new(registry),
    );
    engine.bind_ability(A, "unstable").unwrap();

    for turn in 1..=3 {
        let result = engine.process_turn(&[Action::attack(A, B)]).unwrap();
        assert_eq!(result.turn_number, turn);
        assert!(engine.abilities().instance(A).unwrap().is_active);
    }
    let result = engine.process_turn(&[Action::attack(A, B)]).unwrap();

    let instance = engine.abilities().instance(A).unwrap();
    assert_eq!(instance.error_count, 4);
    assert!(!instance.is_active);
    assert!(result.logs.iter().any(|l| l == "A's unstable stopped working"));

    engine.process_turn(&[Action::attack(A, B)]).unwrap();
    assert_eq!(engine.abilities().instance(A).unwrap().error_count, 4);
}

/// Heals a player that does not exist.
struct StrayMender;

impl Ability for StrayMender {
    fn id(&self) -> &'static str {
        "stray_mender"
    }

    fn name(&self) -> &'static str {
        "Stray Mender"
    }

    fn execute(
        &self,
        _ctx: &mut AbilityContext<'_>,
        _params: &AbilityParams,
    ) -> Result<AbilityOutcome, AbilityError> {
        Ok(AbilityOutcome::success("heals")
            .with_heal(1)
            .with_target(PlayerId(42)))
    }
}

#[test]
fn an_outcome_aimed_at_an_unknown_player_is_a_fault_not_an_abort() {
    let config = GameConfig::default();
    let mut registry = AbilityRegistry::builtin();
    registry.register(Arc::new(StrayMender));
    let mut engine = TurnEngine::with_parts(
        config.clone(),
        Roster::new(players(&config)).unwrap(),
        7,
        StatusEffectEngine::builtin(config.clone()),
        AbilityRuntime::new(registry),
    );
    engine.bind_ability(A, "stray_mender").unwrap();

    let result = engine
        .process_turn(&[Action::ability(A, None), Action::attack(B, A)])
        .unwrap();

    assert_eq!(engine.phase(), TurnPhase::Idle);
    assert_eq!(result.player(A).unwrap().hp, 2);
    assert_eq!(engine.abilities().instance(A).unwrap().error_count, 1);
    assert!(engine.abilities().instance(A).unwrap().is_active);
    assert!(result.logs.iter().any(|l| l.contains("misfired")));

    let next = engine.process_turn(&[Action::attack(B, A)]).unwrap();
    assert_eq!(next.turn_number, 2);
}
