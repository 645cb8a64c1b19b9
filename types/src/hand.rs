use std::cmp::Reverse;

use deckofcards::Suit;
use itertools::Itertools;

use crate::card::{suit_index, Card};

/// Read-only questions about a set of cards.
pub trait Hand {
    fn has_suit(&self, suit: Suit) -> bool;
    fn cards_of_suit(&self, suit: Suit) -> Vec<Card>;
    fn sorted_for_display(&self) -> Vec<Card>;
}

impl Hand for [Card] {
    fn has_suit(&self, suit: Suit) -> bool {
        self.iter().any(|c| c.suit() == suit)
    }

    fn cards_of_suit(&self, suit: Suit) -> Vec<Card> {
        self.iter().filter(|c| c.suit() == suit).copied().collect()
    }

    /// Grouped by suit, highest card first within a suit.
    fn sorted_for_display(&self) -> Vec<Card> {
        self.iter()
            .sorted_by_key(|c| (suit_index(c.suit()), Reverse(c.value())))
            .copied()
            .collect()
    }
}

/// Removing a played card from a hand.
pub trait HandMut {
    fn remove_card(&mut self, card: &Card) -> bool;
}

impl HandMut for Vec<Card> {
    fn remove_card(&mut self, card: &Card) -> bool {
        // keep the remaining order intact; hands are shown as stored
        if let Some(idx) = self.iter().position(|c| c == card) {
            self.remove(idx);
            true
        } else {
            false
        }
    }
}
