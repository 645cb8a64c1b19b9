use std::{collections::HashSet, fmt::Display};

use deckofcards::Suit;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, TRUMP},
    deck::PLAYER_COUNT,
    error::RulesError,
};

/// One card laid on the table, tagged with who laid it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub player_id: String,
    pub card: Card,
}

impl Play {
    pub fn new(player_id: impl Into<String>, card: Card) -> Self {
        Self {
            player_id: player_id.into(),
            card,
        }
    }
}

impl Display for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.player_id, self.card)
    }
}

pub fn lead_suit(trick: &[Play]) -> Option<Suit> {
    trick.first().map(|play| play.card.suit())
}

/// Spades if anyone trumped, otherwise whatever was led.
pub fn winning_suit(trick: &[Play]) -> Option<Suit> {
    if trick.iter().any(|play| play.card.is_trump()) {
        Some(TRUMP)
    } else {
        lead_suit(trick)
    }
}

/// The play currently taking a trick in progress, if any card has been laid.
pub fn current_winner(trick: &[Play]) -> Option<&Play> {
    let suit = winning_suit(trick)?;
    trick
        .iter()
        .filter(|play| play.card.suit() == suit)
        .max_by_key(|play| play.card.value())
}

/// Winner of a completed trick.
///
/// Fails on anything but exactly four plays from four different players, so a
/// trick that was already cleared can never produce a winner.
pub fn evaluate_trick(trick: &[Play]) -> Result<String, RulesError> {
    if trick.len() != PLAYER_COUNT {
        return Err(RulesError::TrickIncomplete(trick.len()));
    }
    let mut seen = HashSet::with_capacity(PLAYER_COUNT);
    if let Some(dup) = trick.iter().find(|play| !seen.insert(&play.player_id)) {
        return Err(RulesError::DuplicatePlay(dup.player_id.clone()));
    }
    let winner = current_winner(trick).ok_or(RulesError::TrickIncomplete(0))?;
    log::debug!(
        "Trick [{}] taken by {}",
        trick.iter().join(", "),
        winner.player_id
    );
    Ok(winner.player_id.clone())
}
