pub mod card;
pub mod command;
pub mod deck;
pub mod error;
pub mod hand;
pub mod player;
pub mod player_state;
pub mod room;
pub mod rules;
pub mod scoring;
pub mod trick;

pub use card::Card;
pub use command::Command;
pub use deck::{create_deck, deal, shuffle, shuffled_deck, PLAYER_COUNT};
pub use error::RulesError;
pub use hand::{Hand, HandMut};
pub use player::Strategy;
pub use player_state::PlayerState;
pub use room::{Phase, Room, RoomEvent};
pub use rules::{is_valid_move, is_valid_move_for, legal_cards, next_turn, Variant};
pub use scoring::round_score;
pub use trick::{evaluate_trick, Play};
