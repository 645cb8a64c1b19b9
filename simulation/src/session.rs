use std::{fmt, sync::Arc};

use serde_json::Value;
use store::{SharedStore, StorePath};
use types::{Command, Room};
use uuid::Uuid;

use crate::SessionError;

/// One client's handle on a room: who it is, which room it sits in, and the
/// store they share.
#[derive(Clone)]
pub struct Session {
    pub client_id: String,
    pub name: String,
    pub room_id: String,
    store: Arc<dyn SharedStore>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client_id", &self.client_id)
            .field("name", &self.name)
            .field("room_id", &self.room_id)
            .finish_non_exhaustive()
    }
}

/// `p_` followed by nine random alphanumerics.
pub fn new_client_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("p_{}", &raw[..9])
}

pub fn room_path(room_id: &str) -> StorePath {
    StorePath::root().child("rooms").child(room_id)
}

impl Session {
    pub fn new(store: Arc<dyn SharedStore>, room_id: &str, name: &str) -> Self {
        Self::with_client_id(store, room_id, name, new_client_id())
    }

    pub fn with_client_id(
        store: Arc<dyn SharedStore>,
        room_id: &str,
        name: &str,
        client_id: String,
    ) -> Self {
        Self {
            client_id,
            name: name.to_string(),
            room_id: room_id.to_string(),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn SharedStore> {
        &self.store
    }

    pub fn room_path(&self) -> StorePath {
        room_path(&self.room_id)
    }

    pub fn player_path(&self) -> StorePath {
        self.room_path().child("players").child(&self.client_id)
    }

    pub fn commands_path(&self) -> StorePath {
        self.room_path().child("commands")
    }

    pub fn command_seq_path(&self) -> StorePath {
        self.room_path().child("commandSeq")
    }

    /// Appends `command` to the room's log under a freshly allocated sequence number.
    /// Refuses once the room is gone, so a late move never recreates a partial record.
    pub async fn propose(&self, command: &Command) -> Result<u64, SessionError> {
        let phase = self.room_path().child("phase");
        if self.store.read(&phase).await?.is_none() {
            return Err(SessionError::RoomClosed(self.room_id.clone()));
        }
        let seq = self
            .store
            .atomic_increment(&self.command_seq_path(), 1)
            .await?;
        // counters start at zero and only ever go up
        let seq = u64::try_from(seq).unwrap_or_default();
        let value = serde_json::to_value(command)?;
        self.store
            .write(&self.commands_path().child(seq), Some(value))
            .await?;
        log::debug!("{} proposed #{seq}: {command}", self.name);
        Ok(seq)
    }

    /// Writes every top-level room field in one update and drops the consumed
    /// commands from the log. Nothing else under the room is touched.
    pub async fn publish(&self, room: &Room, consumed: &[u64]) -> Result<(), SessionError> {
        let Value::Object(fields) = serde_json::to_value(room)? else {
            unreachable!("a room always serializes to an object");
        };
        let room_path = self.room_path();
        let mut updates: Vec<(StorePath, Option<Value>)> = fields
            .into_iter()
            .map(|(key, value)| (room_path.child(key), Some(value)))
            .collect();
        updates.extend(
            consumed
                .iter()
                .map(|seq| (self.commands_path().child(seq), None)),
        );
        self.store.multi_update(updates).await?;
        Ok(())
    }

    /// Drops the connection; the store's leave hook removes the room for everyone.
    pub async fn leave(&self) -> Result<(), SessionError> {
        log::info!("{} leaving room {}", self.name, self.room_id);
        self.store.disconnect(&self.client_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::InMemoryStore;
    use types::Card;

    use super::*;

    fn session(store: &Arc<InMemoryStore>) -> Session {
        Session::with_client_id(store.clone(), "4821", "Asha", "p_a".to_string())
    }

    #[test]
    fn client_ids_have_the_expected_shape() {
        let id = new_client_id();
        assert_eq!(id.len(), 11);
        assert!(id.starts_with("p_"));
        assert!(id[2..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, new_client_id());
    }

    async fn open_room(session: &Session) {
        session.publish(&Room::default(), &[]).await.unwrap();
    }

    #[tokio::test]
    async fn propose_allocates_increasing_sequence_numbers() {
        let store = Arc::new(InMemoryStore::new());
        let session = session(&store);
        open_room(&session).await;
        let bid = Command::Bid {
            player_id: "p_a".into(),
            bid: 3,
        };
        let play = Command::Play {
            player_id: "p_a".into(),
            card: Card::parse("AS").unwrap(),
        };
        assert_eq!(session.propose(&bid).await.unwrap(), 1);
        assert_eq!(session.propose(&play).await.unwrap(), 2);

        let logged = store
            .read(&StorePath::parse("rooms/4821/commands/1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(serde_json::from_value::<Command>(logged).unwrap(), bid);
    }

    #[tokio::test]
    async fn propose_into_a_removed_room_writes_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let session = session(&store);
        open_room(&session).await;
        store.write(&session.room_path(), None).await.unwrap();

        let bid = Command::Bid {
            player_id: "p_a".into(),
            bid: 3,
        };
        assert!(matches!(
            session.propose(&bid).await,
            Err(SessionError::RoomClosed(id)) if id == "4821"
        ));
        assert_eq!(store.read(&session.room_path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn publish_keeps_unconsumed_commands() {
        let store = Arc::new(InMemoryStore::new());
        let session = session(&store);
        for seq in 1..=2 {
            store
                .write(
                    &session.commands_path().child(seq),
                    Some(json!({"kind": "bid", "playerId": "p_a", "bid": 2})),
                )
                .await
                .unwrap();
        }

        let mut room = Room::default();
        room.applied = 1;
        session.publish(&room, &[1]).await.unwrap();

        let stored = store.read(&session.room_path()).await.unwrap().unwrap();
        assert_eq!(stored["applied"], json!(1));
        assert_eq!(stored["phase"], json!("WAITING"));
        assert!(stored["commands"].get("1").is_none());
        assert!(stored["commands"].get("2").is_some());
    }
}
