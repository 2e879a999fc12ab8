use std::sync::Arc;

use arena_core::{Action, GameConfig, Player, PlayerId, Roster};
use arena_runtime::abilities::builtin::ids;
use arena_runtime::history::{load_snapshot, snapshot_key};
use arena_runtime::{
    DataStore, EngineError, FileDataStore, GameSession, HistoryError, InMemoryDataStore,
    InMemoryRecords, SessionConfig,
};
use serde_json::json;
use tempfile::TempDir;

const A: PlayerId = PlayerId(0);
const B: PlayerId = PlayerId(1);

fn roster(b_hp: i32) -> Roster {
    let config = GameConfig::default();
    Roster::new(vec![
        Player::new(A, "A", &config),
        Player::new(B, "B", &config).with_hp(b_hp, b_hp.max(3)),
    ])
    .unwrap()
}

#[tokio::test]
async fn rollback_then_redo_reproduces_the_same_game() {
    let mut session = GameSession::builder(roster(10))
        .bind(A, ids::CHAIN_SPARK)
        .build()
        .unwrap();

    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    let roster_after = session.engine().roster().clone();
    let instances_after = session.engine().abilities().instances().to_vec();
    let history_after = session.engine().history().to_vec();

    assert_eq!(session.rollback(1).unwrap(), 1);
    assert_eq!(session.engine().turn(), 1);
    assert_eq!(session.engine().roster().get(B).unwrap().hp, 9);
    assert!(session.engine().history().len() < history_after.len());

    assert_eq!(session.redo(1).unwrap(), 2);
    assert_eq!(session.engine().roster(), &roster_after);
    assert_eq!(session.engine().abilities().instances(), &instances_after[..]);
    assert_eq!(session.engine().history(), &history_after[..]);
}

#[tokio::test]
async fn playing_after_a_rollback_discards_the_abandoned_branch() {
    let mut session = GameSession::builder(roster(10)).build().unwrap();

    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    session.rollback(1).unwrap();
    assert!(session.history().can_redo());

    let result = session.play_turn(&[Action::pass(A)]).await.unwrap();

    assert_eq!(result.turn_number, 2);
    assert_eq!(result.player(B).unwrap().hp, 9);
    assert_eq!(session.history().len(), 3);
    assert!(!session.history().can_redo());
    assert!(matches!(
        session.redo(1),
        Err(EngineError::History(HistoryError::OutOfRange { .. }))
    ));
}

#[tokio::test]
async fn rollback_restores_hidden_ability_state() {
    let mut session = GameSession::builder(roster(3))
        .bind(B, ids::IRON_WILL)
        .build()
        .unwrap();

    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    assert_eq!(
        session.engine().abilities().instance(B).unwrap().remaining_uses,
        Some(0)
    );

    session.rollback(1).unwrap();
    assert_eq!(
        session.engine().abilities().instance(B).unwrap().remaining_uses,
        Some(1)
    );
}

#[tokio::test]
async fn permanent_vars_carry_over_to_the_next_session() {
    let store: Arc<dyn DataStore> = Arc::new(InMemoryDataStore::new());

    let mut first = GameSession::builder(roster(1))
        .bind(A, ids::VETERAN)
        .store(store.clone())
        .build()
        .unwrap();
    first.play_turn(&[Action::attack(A, B)]).await.unwrap();
    let summary = first.finish().await.unwrap();
    assert_eq!(summary.winner, Some(A));
    assert_eq!(summary.winner_name.as_deref(), Some("A"));
    assert_eq!(
        store.get("vars/veteran/0").await.unwrap(),
        Some(json!({ "wins": 1 }))
    );

    let mut second = GameSession::builder(roster(1))
        .bind(A, ids::VETERAN)
        .store(store.clone())
        .build()
        .unwrap();
    let opening = second.start().await.unwrap();
    assert!(opening.iter().any(|l| l == "A enters with 1 past win(s)"));
}

#[tokio::test]
async fn snapshots_persist_to_the_file_store_with_a_digest() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileDataStore::open(dir.path()).await.unwrap());
    let config = SessionConfig {
        session_id: "duel".to_string(),
        persist_snapshots: true,
        ..SessionConfig::default()
    };
    let mut session = GameSession::builder(roster(3))
        .config(config)
        .store(store.clone())
        .build()
        .unwrap();

    session.play_turn(&[Action::attack(A, B)]).await.unwrap();

    let persisted = load_snapshot(store.as_ref(), "duel", 1)
        .await
        .unwrap()
        .expect("turn 1 persisted");
    assert_eq!(persisted.snapshot.turn, 1);
    assert_eq!(&persisted.snapshot.roster, session.engine().roster());
    assert!(load_snapshot(store.as_ref(), "duel", 0).await.unwrap().is_some());

    let key = snapshot_key("duel", 1);
    let mut tampered = store.get(&key).await.unwrap().unwrap();
    tampered["snapshot"]["turn"] = json!(7);
    store.put(&key, tampered).await.unwrap();
    assert!(matches!(
        load_snapshot(store.as_ref(), "duel", 1).await,
        Err(HistoryError::Corrupted { .. })
    ));
}

#[tokio::test]
async fn records_receive_every_turn_and_the_game_end() {
    let records = InMemoryRecords::new();
    let mut session = GameSession::builder(roster(2))
        .records(Arc::new(records.clone()))
        .session_id("recorded")
        .build()
        .unwrap();

    session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    let last = session.play_turn(&[Action::attack(A, B)]).await.unwrap();
    assert!(last.game_over);
    session.finish().await.unwrap();

    let turns = records.turns().await;
    assert_eq!(turns.len(), 2);
    assert!(turns.iter().all(|(id, _)| id == "recorded"));
    let games = records.games().await;
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].turns, 2);
    assert!(matches!(session.finish().await, Err(EngineError::GameOver)));
}
