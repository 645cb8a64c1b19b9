use std::fmt::Display;

use deckofcards::{Card as DOCCard, Rank, Suit};
use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Suits in deck order. Spades lead because they are trump.
pub const SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

pub const RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

pub const TRUMP: Suit = Suit::Spades;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CardRecord", into = "CardRecord")]
pub struct Card {
    card: DOCCard,
}

/// Shape a card takes inside the shared room record.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct CardRecord {
    suit: String,
    rank: String,
    val: u8,
}

impl Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit_str = match self.card.suit {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        };
        write!(f, "{}{}", rank_label(self.card.rank), suit_str)
    }
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card {
            card: DOCCard { rank, suit },
        }
    }

    pub fn rank(&self) -> Rank {
        self.card.rank
    }

    pub fn suit(&self) -> Suit {
        self.card.suit
    }

    pub fn is_trump(&self) -> bool {
        self.card.suit == TRUMP
    }

    /// Face value, 2 through 14 with the ace high.
    pub fn value(&self) -> u8 {
        rank_value(self.card.rank)
    }

    /// Parses the compact form used at the prompt and in tests, e.g. `10H`, `AS`, `qd`.
    pub fn parse(text: &str) -> Result<Card, RulesError> {
        let text = text.trim();
        let bad = || RulesError::UnknownCard(text.to_string());
        let split = text.char_indices().last().map(|(idx, _)| idx).ok_or_else(bad)?;
        let (rank_part, suit_part) = text.split_at(split);
        let rank = parse_rank(&rank_part.to_uppercase()).ok_or_else(bad)?;
        let suit = parse_suit(&suit_part.to_uppercase()).ok_or_else(bad)?;
        Ok(Card::new(rank, suit))
    }
}

pub fn rank_value(rank: Rank) -> u8 {
    match rank {
        Rank::Two => 2,
        Rank::Three => 3,
        Rank::Four => 4,
        Rank::Five => 5,
        Rank::Six => 6,
        Rank::Seven => 7,
        Rank::Eight => 8,
        Rank::Nine => 9,
        Rank::Ten => 10,
        Rank::Jack => 11,
        Rank::Queen => 12,
        Rank::King => 13,
        Rank::Ace => 14,
    }
}

pub fn rank_label(rank: Rank) -> &'static str {
    match rank {
        Rank::Two => "2",
        Rank::Three => "3",
        Rank::Four => "4",
        Rank::Five => "5",
        Rank::Six => "6",
        Rank::Seven => "7",
        Rank::Eight => "8",
        Rank::Nine => "9",
        Rank::Ten => "10",
        Rank::Jack => "J",
        Rank::Queen => "Q",
        Rank::King => "K",
        Rank::Ace => "A",
    }
}

pub fn suit_label(suit: Suit) -> &'static str {
    match suit {
        Suit::Spades => "S",
        Suit::Hearts => "H",
        Suit::Clubs => "C",
        Suit::Diamonds => "D",
    }
}

/// Position of a suit in [`SUITS`], used wherever suits need a stable order.
pub fn suit_index(suit: Suit) -> usize {
    SUITS
        .iter()
        .position(|&s| s == suit)
        .unwrap_or(SUITS.len())
}

fn parse_rank(label: &str) -> Option<Rank> {
    let rank = match label {
        "T" => Rank::Ten,
        _ => *RANKS.iter().find(|&&r| rank_label(r) == label)?,
    };
    Some(rank)
}

fn parse_suit(label: &str) -> Option<Suit> {
    SUITS.iter().copied().find(|&s| suit_label(s) == label)
}

impl From<Card> for CardRecord {
    fn from(card: Card) -> Self {
        CardRecord {
            suit: suit_label(card.suit()).to_string(),
            rank: rank_label(card.rank()).to_string(),
            val: card.value(),
        }
    }
}

impl TryFrom<CardRecord> for Card {
    type Error = RulesError;

    fn try_from(record: CardRecord) -> Result<Self, Self::Error> {
        let unknown = || RulesError::UnknownCard(format!("{}{}", record.rank, record.suit));
        let rank = parse_rank(&record.rank).ok_or_else(unknown)?;
        let suit = parse_suit(&record.suit).ok_or_else(unknown)?;
        let card = Card::new(rank, suit);
        if card.value() != record.val {
            return Err(unknown());
        }
        Ok(card)
    }
}

impl From<DOCCard> for Card {
    fn from(card: DOCCard) -> Self {
        Self { card }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_cards_are_valued_eleven_through_fourteen() {
        assert_eq!(Card::new(Rank::Jack, Suit::Hearts).value(), 11);
        assert_eq!(Card::new(Rank::Queen, Suit::Hearts).value(), 12);
        assert_eq!(Card::new(Rank::King, Suit::Hearts).value(), 13);
        assert_eq!(Card::new(Rank::Ace, Suit::Hearts).value(), 14);
        assert_eq!(Card::new(Rank::Two, Suit::Clubs).value(), 2);
    }

    #[test]
    fn parses_compact_notation() {
        assert_eq!(Card::parse("10H").unwrap(), Card::new(Rank::Ten, Suit::Hearts));
        assert_eq!(Card::parse("as").unwrap(), Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(Card::parse("TD").unwrap(), Card::new(Rank::Ten, Suit::Diamonds));
        assert!(Card::parse("1X").is_err());
        assert!(Card::parse("").is_err());
    }

    #[test]
    fn record_form_matches_room_layout() {
        let card = Card::new(Rank::King, Suit::Clubs);
        let json = serde_json::to_value(card).unwrap();
        assert_eq!(json, serde_json::json!({"suit": "C", "rank": "K", "val": 13}));
        let back: Card = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn rejects_inconsistent_value() {
        let json = serde_json::json!({"suit": "C", "rank": "K", "val": 4});
        assert!(serde_json::from_value::<Card>(json).is_err());
    }
}
