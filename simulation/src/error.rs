use store::StoreError;
use thiserror::Error;
use types::RulesError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room is full or already started: {0}")]
    RoomFull(String),

    #[error("No free room code after {0} attempts")]
    RoomCollision(usize),

    #[error("Room {0} was closed")]
    RoomClosed(String),

    #[error("{0} left the table")]
    SeatAbandoned(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Malformed room record: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Client task failed: {0}")]
    Task(String),
}
