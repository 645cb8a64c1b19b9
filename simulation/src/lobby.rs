use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use store::{retry_with_backoff, SharedStore, StoreConfig, StoreError, StorePath};
use types::{Phase, PlayerState, Room, PLAYER_COUNT};

use crate::{session::room_path, Session, SessionError, SimulationConfig};

/// A random four digit room code.
pub fn random_room_code(rng: &mut impl Rng) -> String {
    rng.gen_range(1000..=9999).to_string()
}

/// Opens a new room under a random unused code and seats `name` in it.
pub async fn create_room(
    store: Arc<dyn SharedStore>,
    name: &str,
    config: &SimulationConfig,
) -> Result<Session, SessionError> {
    create_room_with_codes(store, name, config, || {
        random_room_code(&mut rand::thread_rng())
    })
    .await
}

/// Like [`create_room`], drawing candidate codes from `next_code`.
pub async fn create_room_with_codes(
    store: Arc<dyn SharedStore>,
    name: &str,
    config: &SimulationConfig,
    mut next_code: impl FnMut() -> String + Send,
) -> Result<Session, SessionError> {
    for attempt in 1..=config.create_attempts {
        let code = next_code();
        let path = room_path(&code);
        if read_with_retry(&store, &path, &config.store).await?.is_some() {
            log::debug!("Room code {code} is taken (attempt {attempt})");
            continue;
        }
        let room = Room::new(config.variant);
        store.write(&path, Some(serde_json::to_value(&room)?)).await?;
        log::info!("Created room {code} ({:?})", config.variant);
        return take_seat(store, &code, name).await;
    }
    Err(SessionError::RoomCollision(config.create_attempts))
}

/// Seats `name` in an existing room that is still waiting for players.
pub async fn join_room(
    store: Arc<dyn SharedStore>,
    room_id: &str,
    name: &str,
    config: &SimulationConfig,
) -> Result<Session, SessionError> {
    if room_id.is_empty() || !room_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionError::RoomNotFound(room_id.to_string()));
    }
    let Some(value) = read_with_retry(&store, &room_path(room_id), &config.store).await? else {
        return Err(SessionError::RoomNotFound(room_id.to_string()));
    };
    let room: Room = serde_json::from_value(value)?;
    if room.phase != Phase::Waiting || room.players.len() >= PLAYER_COUNT {
        return Err(SessionError::RoomFull(room_id.to_string()));
    }
    take_seat(store, room_id, name).await
}

async fn take_seat(
    store: Arc<dyn SharedStore>,
    room_id: &str,
    name: &str,
) -> Result<Session, SessionError> {
    let session = Session::new(store, room_id, name);
    let player = PlayerState::new(session.client_id.clone(), name);
    let store = session.store();
    store
        .write(&session.player_path(), Some(serde_json::to_value(&player)?))
        .await?;
    // any departure ends the table for everyone
    store
        .on_leave(&session.client_id, &session.room_path(), None)
        .await?;
    log::info!("{name} joined room {room_id} as {}", session.client_id);
    Ok(session)
}

async fn read_with_retry(
    store: &Arc<dyn SharedStore>,
    path: &StorePath,
    config: &StoreConfig,
) -> Result<Option<Value>, StoreError> {
    retry_with_backoff(config, || store.read(path)).await
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use super::*;

    fn shared() -> Arc<dyn SharedStore> {
        Arc::new(InMemoryStore::new())
    }

    #[test]
    fn room_codes_are_four_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let code: u32 = random_room_code(&mut rng).parse().unwrap();
            assert!((1000..=9999).contains(&code));
        }
    }

    #[tokio::test]
    async fn create_seats_the_creator() {
        let store = shared();
        let session = create_room(store.clone(), "Asha", &SimulationConfig::default())
            .await
            .unwrap();
        let room: Room = serde_json::from_value(
            store.read(&session.room_path()).await.unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(room.phase, Phase::Waiting);
        assert_eq!(room.players[&session.client_id].name, "Asha");
    }

    #[tokio::test]
    async fn create_skips_taken_codes() {
        let store = shared();
        let config = SimulationConfig::default();
        let first = create_room_with_codes(store.clone(), "A", &config, || "1111".into())
            .await
            .unwrap();
        let mut codes = vec!["2222".to_string(), "1111".to_string()];
        let second = create_room_with_codes(store.clone(), "B", &config, move || {
            codes.pop().unwrap_or_default()
        })
        .await
        .unwrap();
        assert_eq!(first.room_id, "1111");
        assert_eq!(second.room_id, "2222");
    }

    #[tokio::test]
    async fn create_gives_up_after_configured_attempts() {
        let store = shared();
        let config = SimulationConfig {
            create_attempts: 3,
            ..Default::default()
        };
        create_room_with_codes(store.clone(), "A", &config, || "4242".into())
            .await
            .unwrap();
        let result = create_room_with_codes(store, "B", &config, || "4242".into()).await;
        assert!(matches!(result, Err(SessionError::RoomCollision(3))));
    }

    #[tokio::test]
    async fn join_unknown_room_is_not_found() {
        let store = shared();
        let config = SimulationConfig::default();
        for code in ["9999", "", "12/3"] {
            assert!(matches!(
                join_room(store.clone(), code, "A", &config).await,
                Err(SessionError::RoomNotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn fifth_player_is_turned_away() {
        let store = shared();
        let config = SimulationConfig::default();
        let host = create_room(store.clone(), "A", &config).await.unwrap();
        for name in ["B", "C", "D"] {
            join_room(store.clone(), &host.room_id, name, &config)
                .await
                .unwrap();
        }
        assert!(matches!(
            join_room(store, &host.room_id, "E", &config).await,
            Err(SessionError::RoomFull(_))
        ));
    }

    #[tokio::test]
    async fn leaving_closes_the_room() {
        let store = shared();
        let config = SimulationConfig::default();
        let host = create_room(store.clone(), "A", &config).await.unwrap();
        let guest = join_room(store.clone(), &host.room_id, "B", &config)
            .await
            .unwrap();
        guest.leave().await.unwrap();
        assert_eq!(store.read(&host.room_path()).await.unwrap(), None);
    }
}
