use std::sync::Arc;

use simulation::{create_room, join_room, run_client, run_table, SessionError, SimulationConfig};
use store::{InMemoryStore, SharedStore};
use strategies::{DefaultStrategy, RandomStrategy};
use types::{Command, Phase, Strategy, Variant};

fn quick_config(rounds: u32) -> SimulationConfig {
    SimulationConfig {
        trick_delay_ms: 0,
        round_pause_ms: 0,
        rounds: Some(rounds),
        ..Default::default()
    }
}

fn seats(strategies: Vec<Box<dyn Strategy>>) -> Vec<(String, Box<dyn Strategy>)> {
    ["Asha", "Bikram", "Chandra", "Dipa"]
        .into_iter()
        .map(String::from)
        .zip(strategies)
        .collect()
}

fn default_bots() -> Vec<Box<dyn Strategy>> {
    (0..4)
        .map(|_| Box::new(DefaultStrategy::default()) as Box<dyn Strategy>)
        .collect()
}

#[tokio::test]
async fn test_single_round_with_default_strategies() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let rooms = run_table(store, seats(default_bots()), quick_config(1))
        .await
        .expect("Table should finish");

    assert_eq!(rooms.len(), 4);
    let room = &rooms[0];
    assert_eq!(room.phase, Phase::Scoring);
    assert_eq!(room.round, 1);
    assert!(room.players.values().all(|p| p.hand.is_empty()));
    assert_eq!(
        room.players.values().map(|p| p.tricks_won as u32).sum::<u32>(),
        13
    );
    // every client ends on the same final state
    assert!(rooms.iter().all(|other| other == room));
}

#[tokio::test]
async fn test_several_rounds_with_mixed_strategies() {
    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(DefaultStrategy::default()),
        Box::new(RandomStrategy::with_seed(7)),
        Box::new(DefaultStrategy::default()),
        Box::new(RandomStrategy::with_seed(8)),
    ];
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let rooms = run_table(store, seats(strategies), quick_config(3))
        .await
        .expect("Table should finish");

    let room = &rooms[0];
    assert_eq!(room.round, 3);
    assert_eq!(room.phase, Phase::Scoring);
    assert!(room.players.values().all(|p| p.hand.is_empty()));
    // scores are always kept to one decimal place
    for player in room.players.values() {
        let tenths = player.score * 10.0;
        assert!((tenths - tenths.round()).abs() < 1e-9, "{}", player.score);
    }
}

#[tokio::test]
async fn test_must_overtake_variant_finishes() {
    let config = SimulationConfig {
        variant: Variant::MustOvertake,
        ..quick_config(1)
    };
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let rooms = run_table(store, seats(default_bots()), config)
        .await
        .expect("Table should finish");
    assert_eq!(rooms[0].variant, Variant::MustOvertake);
    assert_eq!(rooms[0].phase, Phase::Scoring);
}

#[tokio::test]
async fn test_seating_follows_ids_not_join_order() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let config = quick_config(1);
    let host = create_room(store.clone(), "Asha", &config).await.unwrap();
    let mut sessions = vec![host.clone()];
    for name in ["Bikram", "Chandra", "Dipa"] {
        sessions.push(
            join_room(store.clone(), &host.room_id, name, &config)
                .await
                .unwrap(),
        );
    }

    let handles: Vec<_> = sessions
        .iter()
        .cloned()
        .zip(default_bots())
        .map(|(session, strategy)| tokio::spawn(run_client(session, strategy, config.clone())))
        .collect();
    let mut finals = Vec::new();
    for handle in handles {
        finals.push(handle.await.unwrap().unwrap());
    }

    let mut ids: Vec<String> = sessions.iter().map(|s| s.client_id.clone()).collect();
    ids.sort();
    assert_eq!(finals[0].seat_order(), ids);
    assert_eq!(finals[0].host_id(), Some(ids[0].as_str()));
}

#[tokio::test]
async fn test_joining_missing_or_full_rooms() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let config = quick_config(1);
    assert!(matches!(
        join_room(store.clone(), "1234", "Asha", &config).await,
        Err(SessionError::RoomNotFound(_))
    ));

    let host = create_room(store.clone(), "Asha", &config).await.unwrap();
    for name in ["Bikram", "Chandra", "Dipa"] {
        join_room(store.clone(), &host.room_id, name, &config)
            .await
            .unwrap();
    }
    assert!(matches!(
        join_room(store, &host.room_id, "Esha", &config).await,
        Err(SessionError::RoomFull(_))
    ));
}

#[tokio::test]
async fn test_disconnect_closes_room_for_everyone() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let config = quick_config(1);
    let host = create_room(store.clone(), "Asha", &config).await.unwrap();
    let guest = join_room(store.clone(), &host.room_id, "Bikram", &config)
        .await
        .unwrap();

    let waiting = tokio::spawn(run_client(
        host.clone(),
        Box::new(DefaultStrategy::default()),
        config.clone(),
    ));
    tokio::task::yield_now().await;
    guest.leave().await.unwrap();

    let result = waiting.await.unwrap();
    assert!(matches!(result, Err(SessionError::RoomClosed(id)) if id == host.room_id));
}

#[tokio::test]
async fn test_late_proposal_after_a_departure_still_closes_the_room() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let config = quick_config(1);
    let host = create_room(store.clone(), "Asha", &config).await.unwrap();
    let guest = join_room(store.clone(), &host.room_id, "Bikram", &config)
        .await
        .unwrap();
    let latecomer = join_room(store.clone(), &host.room_id, "Chandra", &config)
        .await
        .unwrap();

    let watching = tokio::spawn(run_client(
        host.clone(),
        Box::new(DefaultStrategy::default()),
        config.clone(),
    ));
    tokio::task::yield_now().await;

    guest.leave().await.unwrap();
    let late_bid = Command::Bid {
        player_id: latecomer.client_id.clone(),
        bid: 3,
    };
    assert!(matches!(
        latecomer.propose(&late_bid).await,
        Err(SessionError::RoomClosed(_))
    ));

    let result = watching.await.unwrap();
    assert!(matches!(result, Err(SessionError::RoomClosed(id)) if id == host.room_id));
    assert_eq!(store.read(&host.room_path()).await.unwrap(), None);
}

#[tokio::test]
async fn test_room_losing_its_state_counts_as_closed() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemoryStore::new());
    let config = quick_config(1);
    let host = create_room(store.clone(), "Asha", &config).await.unwrap();

    let watching = tokio::spawn(run_client(
        host.clone(),
        Box::new(DefaultStrategy::default()),
        config.clone(),
    ));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    // the record survives but no longer decodes as a room
    store
        .write(&host.room_path().child("phase"), None)
        .await
        .unwrap();

    let result = watching.await.unwrap();
    assert!(matches!(result, Err(SessionError::RoomClosed(_))));
}
