use rand::{seq::SliceRandom, Rng};

use crate::card::{Card, RANKS, SUITS};

pub const DECK_SIZE: usize = 52;
pub const PLAYER_COUNT: usize = 4;
pub const HAND_SIZE: usize = DECK_SIZE / PLAYER_COUNT;

/// All 52 cards, unshuffled, suit by suit.
pub fn create_deck() -> Vec<Card> {
    SUITS
        .iter()
        .flat_map(|&suit| RANKS.iter().map(move |&rank| Card::new(rank, suit)))
        .collect()
}

/// Uniform random permutation of the deck (`SliceRandom::shuffle` is Fisher-Yates).
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    deck.shuffle(rng);
}

pub fn shuffled_deck<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    let mut deck = create_deck();
    shuffle(&mut deck, rng);
    deck
}

/// Splits the deck into four consecutive 13-card hands. Hand `i` belongs to seat `i`.
pub fn deal(deck: &[Card]) -> [Vec<Card>; PLAYER_COUNT] {
    assert_eq!(
        deck.len(),
        DECK_SIZE,
        "Attempted to deal a deck of {} cards",
        deck.len()
    );
    let mut hands = deck.chunks(HAND_SIZE).map(|chunk| chunk.to_vec());
    std::array::from_fn(|_| hands.next().unwrap_or_default())
}
