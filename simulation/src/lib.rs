//! Clients for a four-player Callbreak table kept in a shared store.
//!
//! Every client subscribes to its room and appends its moves to the room's
//! command log. The client with the lowest id also runs the [`Arbiter`], the
//! only writer of room state.

pub mod arbiter;
pub mod client;
pub mod config;
pub mod error;
pub mod lobby;
pub mod session;
pub mod snapshot;
pub mod table;

pub use arbiter::Arbiter;
pub use client::{run_client, Seat};
pub use config::{ConfigOverrides, SimulationConfig};
pub use error::SessionError;
pub use lobby::{create_room, create_room_with_codes, join_room, random_room_code};
pub use session::Session;
pub use snapshot::RoomSnapshot;
pub use table::run_table;
