use arena_core::{
    Action, EventKind, EventPayload, GameConfig, Player, PlayerId, PlayerStatus, Roster,
    effect_ids,
};
use arena_runtime::{EngineError, TurnEngine, TurnPhase};

const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);
const C: PlayerId = PlayerId(2);

fn engine_with(config: GameConfig, players: Vec<Player>) -> TurnEngine {
    let roster = Roster::new(players).unwrap();
    TurnEngine::new(config, roster, 42)
}

fn duel() -> TurnEngine {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config),
    ];
    engine_with(config, players)
}

fn count(engine: &TurnEngine, kind: EventKind) -> usize {
    engine.history().iter().filter(|e| e.kind() == kind).count()
}

#[test]
fn defend_nullifies_the_attack_and_spends_one_gauge() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_defense_gauge(2, 3),
    ];
    let mut engine = engine_with(config, players);

    let result = engine
        .process_turn(&[Action::attack(A, B), Action::defend(B)])
        .unwrap();

    let b = result.player(B).unwrap();
    assert_eq!(b.hp, 3);
    assert_eq!(b.defense_gauge, 1);
    assert!(
        result.logs.iter().any(|l| l.contains("B blocked A's attack")),
        "logs: {:?}",
        result.logs
    );
    assert_eq!(count(&engine, EventKind::DefendAction), 1);
    assert_eq!(count(&engine, EventKind::PerfectGuard), 0);
}

#[test]
fn a_defense_sealed_player_keeps_the_gauge_and_takes_the_hit() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_defense_gauge(2, 3),
    ];
    let mut engine = engine_with(config, players);
    engine.apply_status(B, effect_ids::DEFENSE_SEAL, 2, 1).unwrap();

    let result = engine
        .process_turn(&[Action::attack(A, B), Action::defend(B)])
        .unwrap();

    let b = result.player(B).unwrap();
    assert!(result.logs.iter().any(|l| l == "B cannot defend while sealed"));
    assert_eq!(b.defense_gauge, 2);
    assert_eq!(b.hp, 2);
    assert_eq!(count(&engine, EventKind::AfterDefend), 0);
    assert_eq!(count(&engine, EventKind::DefendAction), 0);
}

#[test]
fn defend_without_gauge_fails_and_the_attack_lands() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_defense_gauge(0, 3),
    ];
    let mut engine = engine_with(config, players);

    let result = engine
        .process_turn(&[Action::attack(A, B), Action::defend(B)])
        .unwrap();

    assert_eq!(result.player(B).unwrap().hp, 2);
    assert_eq!(result.player(B).unwrap().defense_gauge, 0);
    assert!(result.logs.iter().any(|l| l.contains("insufficient gauge")));
}

#[test]
fn third_consecutive_attack_on_one_target_is_a_focus_attack() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_hp(10, 10),
    ];
    let mut engine = engine_with(config, players);

    for _ in 0..3 {
        engine
            .process_turn(&[Action::attack(A, B), Action::pass(B)])
            .unwrap();
    }

    assert_eq!(engine.roster().get(B).unwrap().hp, 10 - 1 - 1 - 3);
    let focus: Vec<_> = engine
        .history()
        .iter()
        .filter_map(|e| match *e.payload() {
            EventPayload::FocusAttack { streak, bonus, .. } => Some((streak, bonus)),
            _ => None,
        })
        .collect();
    assert_eq!(focus, vec![(3, 2)]);
}

#[test]
fn a_skipped_turn_restarts_the_focus_streak() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_hp(10, 10),
    ];
    let mut engine = engine_with(config, players);

    engine.process_turn(&[Action::attack(A, B)]).unwrap();
    engine.process_turn(&[Action::attack(A, B)]).unwrap();
    engine.process_turn(&[Action::pass(A)]).unwrap();
    engine.process_turn(&[Action::attack(A, B)]).unwrap();

    assert_eq!(count(&engine, EventKind::FocusAttack), 0);
    assert_eq!(engine.roster().get(B).unwrap().hp, 7);
}

#[test]
fn simultaneous_kills_credit_each_killer() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config).with_hp(1, 3),
        Player::new(B, "B", &config).with_hp(1, 3),
        Player::new(C, "C", &config).with_hp(1, 3),
    ];
    let mut engine = engine_with(config, players);

    let result = engine
        .process_turn(&[
            Action::attack(A, B),
            Action::attack(B, C),
            Action::attack(C, A),
        ])
        .unwrap();

    for (victim, killer) in [(B, A), (C, B), (A, C)] {
        let player = result.player(victim).unwrap();
        assert_eq!(player.status, PlayerStatus::Dead);
        assert_eq!(player.killed_by, Some(killer));
    }
    for line in ["B was defeated by A", "C was defeated by B", "A was defeated by C"] {
        assert!(result.logs.iter().any(|l| l == line), "missing {line:?}");
    }
    assert!(result.game_over);
    assert_eq!(result.winner, None);
    assert_eq!(count(&engine, EventKind::Death), 3);

    assert!(matches!(
        engine.process_turn(&[]),
        Err(EngineError::GameOver)
    ));
}

#[test]
fn invalid_declarations_are_dropped_and_logged() {
    let mut engine = duel();

    let result = engine
        .process_turn(&[
            Action::attack(A, A),
            Action::pass(PlayerId(7)),
            Action::attack(B, A),
            Action::defend(B),
            Action::attack(A, PlayerId(9)),
        ])
        .unwrap();

    assert_eq!(result.actions, vec![Action::attack(B, A)]);
    assert_eq!(result.player(A).unwrap().hp, 2);
    assert!(result.logs.iter().any(|l| l.contains("A cannot attack self")));
    assert!(result.logs.iter().any(|l| l.contains("unknown player #7")));
    assert!(result.logs.iter().any(|l| l.contains("B already declared")));
}

#[test]
fn an_attack_always_decreases_evade_count() {
    let config = GameConfig::default();
    let players = vec![
        Player::new(A, "A", &config).with_evade_count(2),
        Player::new(B, "B", &config).with_hp(10, 10),
    ];
    let mut engine = engine_with(config, players);

    engine.process_turn(&[Action::attack(A, B)]).unwrap();
    engine.process_turn(&[Action::evade(B)]).unwrap();

    assert_eq!(engine.roster().get(A).unwrap().evade_count, 1);
    assert_eq!(engine.roster().get(B).unwrap().evade_count, 1);
}

#[test]
fn evade_rolls_are_reproducible_for_a_seed() {
    let run = || {
        let config = GameConfig::default();
        let players = (0..8)
            .map(|i| Player::new(PlayerId(i), format!("P{i}"), &config).with_hp(10, 10))
            .collect();
        let mut engine = engine_with(config, players);
        let mut results = Vec::new();
        for _ in 0..4 {
            let actions: Vec<Action> = (0..8)
                .map(|i| {
                    if i % 2 == 0 {
                        Action::attack(PlayerId(i), PlayerId(i + 1))
                    } else {
                        Action::evade(PlayerId(i))
                    }
                })
                .collect();
            results.push(engine.process_turn(&actions).unwrap());
        }
        (results, engine.history().to_vec())
    };

    let (first, first_history) = run();
    let (second, second_history) = run();
    assert_eq!(first, second);
    assert_eq!(first_history, second_history);
    assert!(first_history.iter().any(|e| e.kind() == EventKind::AfterEvade));
}

#[test]
fn status_effects_resolve_before_turn_end_hooks() {
    let mut engine = duel();
    engine.apply_status(B, effect_ids::POISON, 1, 1).unwrap();

    let result = engine.process_turn(&[Action::pass(A)]).unwrap();

    assert_eq!(result.player(B).unwrap().hp, 2);
    assert!(!result.player(B).unwrap().status_effects.contains(effect_ids::POISON));
    assert!(result.logs.iter().any(|l| l == "B's Poison wore off"));

    let kinds: Vec<EventKind> = engine.history().iter().map(|e| e.kind()).collect();
    let removed = kinds
        .iter()
        .position(|&k| k == EventKind::StatusEffectRemoved)
        .unwrap();
    let turn_end = kinds.iter().position(|&k| k == EventKind::TurnEnd).unwrap();
    assert!(removed < turn_end);
}

#[test]
fn crack_bursts_once_three_stacks_are_held_at_turn_end() {
    let mut engine = duel();
    engine.apply_status(B, effect_ids::CRACK, -1, 2).unwrap();

    engine.process_turn(&[Action::pass(A)]).unwrap();
    assert_eq!(engine.roster().get(B).unwrap().hp, 3);

    engine.apply_status(B, effect_ids::CRACK, -1, 1).unwrap();
    let result = engine.process_turn(&[Action::pass(A)]).unwrap();

    let b = result.player(B).unwrap();
    assert_eq!(b.hp, 2);
    assert!(!b.status_effects.contains(effect_ids::CRACK));
}

#[test]
fn death_zone_escalates_and_kills_without_credit() {
    let config = GameConfig::default().with_death_zone(0, 1, 1);
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config),
    ];
    let mut engine = engine_with(config, players);

    let first = engine.process_turn(&[]).unwrap();
    assert!(first.is_death_zone);
    assert_eq!(first.player(A).unwrap().hp, 2);
    assert_eq!(engine.counters().death_zone_stage, 1);

    let second = engine.process_turn(&[]).unwrap();
    for id in [A, B] {
        let player = second.player(id).unwrap();
        assert_eq!(player.status, PlayerStatus::Dead);
        assert_eq!(player.killed_by, None);
    }
    assert!(second.logs.iter().any(|l| l == "A was defeated"));
    assert!(second.game_over);
}

#[test]
fn a_cancelled_death_zone_deals_no_damage() {
    let config = GameConfig::default().with_death_zone(0, 1, 1);
    let players = vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config),
    ];
    let mut engine = engine_with(config, players);
    engine.subscribe(EventKind::DeathZone, |event, _, _| {
        event.cancel();
        Ok(())
    });

    let result = engine.process_turn(&[]).unwrap();

    assert_eq!(result.player(A).unwrap().hp, 3);
    assert_eq!(engine.counters().death_zone_stage, 1);
}

#[test]
fn a_failed_turn_blocks_the_engine_until_restored() {
    let mut engine = duel();
    let before = engine.snapshot(Vec::new());
    let sub = engine.subscribe(EventKind::TurnEnd, |_, _, _| Err("observer crashed".into()));

    let err = engine.process_turn(&[Action::attack(A, B)]).unwrap_err();
    assert!(matches!(err, EngineError::Bus(_)));
    assert!(err.is_fatal());
    assert_eq!(engine.phase(), TurnPhase::TurnEnd);

    assert!(matches!(
        engine.process_turn(&[Action::attack(A, B)]),
        Err(EngineError::Aborted {
            phase: TurnPhase::TurnEnd
        })
    ));

    assert!(engine.unsubscribe(sub));
    engine.restore(&before, Vec::new());
    assert_eq!(engine.roster().get(B).unwrap().hp, 3);

    let result = engine.process_turn(&[Action::attack(A, B)]).unwrap();
    assert_eq!(result.turn_number, 1);
    assert_eq!(result.player(B).unwrap().hp, 2);
}
