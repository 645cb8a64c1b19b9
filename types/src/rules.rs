//! Which cards a player may lay on the current trick.
//!
//! The default [`Variant::FollowSuit`] only enforces following the led suit and
//! trumping when void. [`Variant::MustOvertake`] adds the stricter table rule that
//! a player must also beat the card currently winning when they are able to.

use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, TRUMP},
    deck::PLAYER_COUNT,
    hand::Hand,
    trick::{current_winner, lead_suit, Play},
};

pub const MIN_BID: u8 = 1;
pub const MAX_BID: u8 = 8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Variant {
    #[default]
    FollowSuit,
    MustOvertake,
}

pub fn is_valid_bid(bid: u8) -> bool {
    (MIN_BID..=MAX_BID).contains(&bid)
}

pub fn next_turn(turn_index: usize) -> usize {
    (turn_index + 1) % PLAYER_COUNT
}

/// Follow suit if you can, trump if you can't, otherwise anything goes.
pub fn is_valid_move(hand: &[Card], trick: &[Play], card: &Card) -> bool {
    let Some(lead) = lead_suit(trick) else {
        return true;
    };
    if hand.has_suit(lead) {
        card.suit() == lead
    } else if hand.has_suit(TRUMP) {
        card.is_trump()
    } else {
        true
    }
}

pub fn is_valid_move_for(variant: Variant, hand: &[Card], trick: &[Play], card: &Card) -> bool {
    match variant {
        Variant::FollowSuit => is_valid_move(hand, trick, card),
        Variant::MustOvertake => {
            is_valid_move(hand, trick, card) && overtakes_when_able(hand, trick, card)
        }
    }
}

/// Every card in `hand` that may legally be laid on `trick`.
pub fn legal_cards(variant: Variant, hand: &[Card], trick: &[Play]) -> Vec<Card> {
    hand.iter()
        .filter(|card| is_valid_move_for(variant, hand, trick, card))
        .copied()
        .collect()
}

// Only called once the follow/trump rule has passed, so `card` is already of the
// suit the player is obliged to play.
fn overtakes_when_able(hand: &[Card], trick: &[Play], card: &Card) -> bool {
    let Some(winner) = current_winner(trick) else {
        return true;
    };
    let best = winner.card;
    // following a trumped trick with the led suit can never win
    if card.suit() != best.suit() {
        return true;
    }
    let can_beat = hand
        .iter()
        .any(|c| c.suit() == best.suit() && c.value() > best.value());
    !can_beat || card.value() > best.value()
}
