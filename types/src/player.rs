use std::fmt::Debug;

use crate::{card::Card, room::Room, PlayerState};

/// How a seat chooses its bid and its cards.
///
/// `legal` is never empty when `select_card` is called, and the returned card
/// must be one of its entries. Returning `None` gives up the seat, which ends
/// the table for everyone.
pub trait Strategy: Debug + Send {
    fn select_bid(&mut self, me: &PlayerState, room: &Room) -> Option<u8>;

    fn select_card(&mut self, me: &PlayerState, room: &Room, legal: &[Card]) -> Option<Card>;
}
