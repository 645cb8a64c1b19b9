use std::sync::Arc;

use store::SharedStore;
use types::{Room, Strategy};

use crate::{create_room, join_room, run_client, SessionError, SimulationConfig};

/// Seats every `(name, strategy)` pair at a fresh room on `store` and plays
/// until the configured round limit. Returns each client's final view, in
/// seating order of the input.
pub async fn run_table(
    store: Arc<dyn SharedStore>,
    seats: Vec<(String, Box<dyn Strategy>)>,
    config: SimulationConfig,
) -> Result<Vec<Room>, SessionError> {
    let mut seats = seats.into_iter();
    let Some((host_name, host_strategy)) = seats.next() else {
        return Err(SessionError::Config("a table needs players".to_string()));
    };
    let host = create_room(store.clone(), &host_name, &config).await?;
    let room_id = host.room_id.clone();
    let mut sessions = vec![(host, host_strategy)];
    for (name, strategy) in seats {
        let session = join_room(store.clone(), &room_id, &name, &config).await?;
        sessions.push((session, strategy));
    }

    let handles: Vec<_> = sessions
        .into_iter()
        .map(|(session, strategy)| tokio::spawn(run_client(session, strategy, config.clone())))
        .collect();

    let mut rooms = Vec::with_capacity(handles.len());
    for handle in handles {
        let room = handle
            .await
            .map_err(|err| SessionError::Task(err.to_string()))??;
        rooms.push(room);
    }
    Ok(rooms)
}
