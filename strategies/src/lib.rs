pub mod input_strategy;

use deckofcards::Rank;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use types::{
    card::TRUMP,
    rules::{MAX_BID, MIN_BID},
    trick::current_winner,
    Card, Hand, PlayerState, Room, Strategy,
};

pub use crate::input_strategy::InputStrategy;

#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomStrategy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn select_bid(&mut self, _me: &PlayerState, _room: &Room) -> Option<u8> {
        Some(self.rng.gen_range(MIN_BID..=4))
    }

    fn select_card(&mut self, _me: &PlayerState, _room: &Room, legal: &[Card]) -> Option<Card> {
        legal.choose(&mut self.rng).copied()
    }
}

/// Bids its sure tricks, then tries to make exactly that many as cheaply as possible.
#[derive(Debug, Default)]
pub struct DefaultStrategy {}

impl Strategy for DefaultStrategy {
    fn select_bid(&mut self, me: &PlayerState, _room: &Room) -> Option<u8> {
        Some(estimate_tricks(&me.hand).clamp(MIN_BID, MAX_BID))
    }

    fn select_card(&mut self, me: &PlayerState, room: &Room, legal: &[Card]) -> Option<Card> {
        let needs_tricks = me.tricks_won < me.bid.unwrap_or(0);
        let lowest = lowest_card(legal)?;

        if room.trick.is_empty() {
            // lead a side-suit ace while tricks are still wanted
            if needs_tricks {
                if let Some(ace) = legal
                    .iter()
                    .find(|c| c.rank() == Rank::Ace && !c.is_trump())
                {
                    return Some(*ace);
                }
            }
            return Some(lowest);
        }

        let winners: Vec<Card> = legal
            .iter()
            .filter(|card| beats_current(room, card))
            .copied()
            .collect();
        if needs_tricks && !winners.is_empty() {
            return lowest_card(&winners);
        }
        // shed the cheapest card that does not take the trick, if there is one
        let losers: Vec<Card> = legal
            .iter()
            .filter(|card| !winners.contains(card))
            .copied()
            .collect();
        Some(lowest_card(&losers).unwrap_or(lowest))
    }
}

/// Aces and guarded kings outside trump, plus spade strength.
fn estimate_tricks(hand: &[Card]) -> u8 {
    let mut tricks = 0u8;
    for card in hand.iter().filter(|c| !c.is_trump()) {
        let suit_len = hand.cards_of_suit(card.suit()).len();
        match card.rank() {
            Rank::Ace => tricks += 1,
            Rank::King if (2..=4).contains(&suit_len) => tricks += 1,
            _ => {}
        }
    }
    let spades = hand.cards_of_suit(TRUMP);
    let high_spades = spades.iter().filter(|c| c.value() >= 12).count();
    let long_spades = spades.len().saturating_sub(3);
    tricks + (high_spades + long_spades) as u8
}

fn beats_current(room: &Room, card: &Card) -> bool {
    match current_winner(&room.trick) {
        None => true,
        Some(best) if best.card.suit() == card.suit() => card.value() > best.card.value(),
        Some(_) => card.is_trump(),
    }
}

/// Lowest card, preferring to keep trumps.
fn lowest_card(cards: &[Card]) -> Option<Card> {
    cards
        .iter()
        .min_by_key(|c| (c.is_trump(), c.value()))
        .copied()
}
