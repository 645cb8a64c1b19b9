use thiserror::Error;

use crate::room::Phase;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RulesError {
    #[error("Illegal card for this trick: {0}")]
    InvalidMove(String),

    #[error("Not {0}'s turn")]
    OutOfTurn(String),

    #[error("Turn is locked while the trick is resolved")]
    TurnLocked,

    #[error("Expected phase {expected:?}, room is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("Bid must be between 1 and 8, got {0}")]
    InvalidBid(u8),

    #[error("Player already bid: {0}")]
    AlreadyBid(String),

    #[error("Card {card} is not in {player}'s hand")]
    CardNotInHand { player: String, card: String },

    #[error("Player not found: {0}")]
    UnknownPlayer(String),

    #[error("Unrecognised card: {0}")]
    UnknownCard(String),

    #[error("Room already has four players")]
    RoomFull,

    #[error("Player already seated: {0}")]
    DuplicatePlayer(String),

    #[error("Trick has {0} cards, expected 4")]
    TrickIncomplete(usize),

    #[error("Player played twice in one trick: {0}")]
    DuplicatePlay(String),

    #[error("Need four players to deal, have {0}")]
    NotEnoughPlayers(usize),
}
