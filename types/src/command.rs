use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::card::Card;

/// A move proposed by a player and applied by the arbiter in sequence order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    Bid { player_id: String, bid: u8 },
    #[serde(rename_all = "camelCase")]
    Play { player_id: String, card: Card },
}

impl Command {
    pub fn player_id(&self) -> &str {
        match self {
            Command::Bid { player_id, .. } | Command::Play { player_id, .. } => player_id,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Bid { player_id, bid } => write!(f, "{player_id} bids {bid}"),
            Command::Play { player_id, card } => write!(f, "{player_id} plays {card}"),
        }
    }
}
