use std::fmt::{Debug, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{card::Card, hand::Hand};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub tricks_won: u8,
    #[serde(default, with = "unset_bid")]
    pub bid: Option<u8>,
    #[serde(default)]
    pub hand: Vec<Card>,
}

impl Display for PlayerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (bid {}, won {}, score {:.1}) Hand: {}",
            self.name,
            self.bid
                .map_or_else(|| "-".to_string(), |bid| bid.to_string()),
            self.tricks_won,
            self.score,
            self.hand.sorted_for_display().iter().join(", ")
        )
    }
}

impl PlayerState {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score: 0.0,
            tricks_won: 0,
            bid: None,
            hand: Vec::new(),
        }
    }

    /// Clears everything that belongs to a single round and hands over new cards.
    pub fn reset_for_round(&mut self, dealt_hand: Vec<Card>) {
        self.hand = dealt_hand;
        self.bid = None;
        self.tricks_won = 0;
    }

    pub fn has_bid(&self) -> bool {
        self.bid.is_some()
    }
}

/// The room record stores an unset bid as `0`.
mod unset_bid {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bid: &Option<u8>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(bid.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
        let raw = Option::<u8>::deserialize(deserializer)?;
        Ok(raw.filter(|&bid| bid != 0))
    }
}
