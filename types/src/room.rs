use std::{collections::BTreeMap, fmt::Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    card::Card,
    command::Command,
    deck::{deal, DECK_SIZE, PLAYER_COUNT},
    error::RulesError,
    hand::HandMut,
    player_state::PlayerState,
    rules::{is_valid_bid, is_valid_move_for, next_turn, Variant},
    scoring::{accumulate, round_score},
    trick::{evaluate_trick, Play},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Waiting,
    Bidding,
    Playing,
    Scoring,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Waiting => write!(f, "WAITING"),
            Phase::Bidding => write!(f, "BIDDING"),
            Phase::Playing => write!(f, "PLAYING"),
            Phase::Scoring => write!(f, "SCORING"),
        }
    }
}

/// The shared aggregate every client renders from.
///
/// Players live in a map keyed by id, so iterating it always walks the seats in
/// lexicographic id order no matter who joined first. `turn_index` is `None`
/// while a completed trick waits to be resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub phase: Phase,
    pub round: u32,
    #[serde(with = "turn_lock")]
    pub turn_index: Option<usize>,
    pub trick_starter: usize,
    #[serde(default)]
    pub trick: Vec<Play>,
    #[serde(default)]
    pub players: BTreeMap<String, PlayerState>,
    #[serde(default)]
    pub variant: Variant,
    /// Sequence number of the last command the arbiter applied.
    #[serde(default)]
    pub applied: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RoomEvent {
    PlayerJoined { player_id: String },
    RoundDealt { round: u32, trick_starter: usize },
    BidPlaced { player_id: String, bid: u8 },
    BiddingClosed,
    CardPlayed { player_id: String, card: Card },
    TrickLocked,
    TrickWon { player_id: String, tricks_won: u8 },
    RoundScored { deltas: Vec<(String, f64)> },
}

impl Default for Room {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl Room {
    pub fn new(variant: Variant) -> Self {
        Self {
            phase: Phase::Waiting,
            round: 1,
            turn_index: Some(0),
            trick_starter: 0,
            trick: Vec::new(),
            players: BTreeMap::new(),
            variant,
            applied: 0,
        }
    }

    pub fn add_player(&mut self, player: PlayerState) -> Result<RoomEvent, RulesError> {
        if self.players.contains_key(&player.id) {
            return Err(RulesError::DuplicatePlayer(player.id));
        }
        if self.players.len() >= PLAYER_COUNT {
            return Err(RulesError::RoomFull);
        }
        log::info!("{} joined as {}", player.name, player.id);
        let player_id = player.id.clone();
        self.players.insert(player.id.clone(), player);
        Ok(RoomEvent::PlayerJoined { player_id })
    }

    pub fn seat_order(&self) -> Vec<&str> {
        self.players.keys().map(String::as_str).collect()
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.keys().position(|id| id == player_id)
    }

    /// The lowest id present; only this client performs orchestration writes.
    pub fn host_id(&self) -> Option<&str> {
        self.players.keys().next().map(String::as_str)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id() == Some(player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerState> {
        self.players.get(player_id)
    }

    fn player_mut(&mut self, player_id: &str) -> Result<&mut PlayerState, RulesError> {
        self.players
            .get_mut(player_id)
            .ok_or_else(|| RulesError::UnknownPlayer(player_id.to_string()))
    }

    pub fn current_player_id(&self) -> Option<&str> {
        let turn = self.turn_index?;
        self.players.keys().nth(turn).map(String::as_str)
    }

    pub fn is_turn_locked(&self) -> bool {
        self.turn_index.is_none()
    }

    pub fn ready_to_start(&self) -> bool {
        self.phase == Phase::Waiting && self.players.len() == PLAYER_COUNT
    }

    pub fn all_bids_in(&self) -> bool {
        self.players.len() == PLAYER_COUNT && self.players.values().all(PlayerState::has_bid)
    }

    pub fn round_complete(&self) -> bool {
        self.trick.is_empty() && self.players.values().all(|p| p.hand.is_empty())
    }

    pub fn tricks_completed(&self) -> usize {
        self.players.values().map(|p| usize::from(p.tricks_won)).sum()
    }

    /// Cards in hands, on the table, and already taken. Always 52 mid-round.
    pub fn cards_accounted(&self) -> usize {
        let in_hands: usize = self.players.values().map(|p| p.hand.len()).sum();
        in_hands + self.trick.len() + PLAYER_COUNT * self.tricks_completed()
    }

    /// Highest score first.
    pub fn standings(&self) -> Vec<&PlayerState> {
        self.players
            .values()
            .sorted_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    fn require_phase(&self, expected: Phase) -> Result<(), RulesError> {
        if self.phase != expected {
            return Err(RulesError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// First deal once the fourth player has joined.
    pub fn start_game(&mut self, deck: &[Card]) -> Result<Vec<RoomEvent>, RulesError> {
        self.require_phase(Phase::Waiting)?;
        if self.players.len() != PLAYER_COUNT {
            return Err(RulesError::NotEnoughPlayers(self.players.len()));
        }
        self.trick_starter = 0;
        Ok(vec![self.deal_round(deck)])
    }

    fn deal_round(&mut self, deck: &[Card]) -> RoomEvent {
        let hands = deal(deck);
        for (player, hand) in self.players.values_mut().zip(hands) {
            player.reset_for_round(hand);
        }
        self.trick.clear();
        self.turn_index = Some(self.trick_starter);
        self.phase = Phase::Bidding;
        log::info!(
            "Round {} dealt, seat {} leads",
            self.round,
            self.trick_starter
        );
        RoomEvent::RoundDealt {
            round: self.round,
            trick_starter: self.trick_starter,
        }
    }

    pub fn place_bid(&mut self, player_id: &str, bid: u8) -> Result<Vec<RoomEvent>, RulesError> {
        self.require_phase(Phase::Bidding)?;
        if !is_valid_bid(bid) {
            return Err(RulesError::InvalidBid(bid));
        }
        let player = self.player_mut(player_id)?;
        if player.has_bid() {
            return Err(RulesError::AlreadyBid(player_id.to_string()));
        }
        player.bid = Some(bid);
        log::info!("{} bid {bid}", player.name);

        let mut events = vec![RoomEvent::BidPlaced {
            player_id: player_id.to_string(),
            bid,
        }];
        if self.all_bids_in() {
            self.phase = Phase::Playing;
            self.turn_index = Some(self.trick_starter);
            log::info!("Bidding closed, play starts at seat {}", self.trick_starter);
            events.push(RoomEvent::BiddingClosed);
        }
        Ok(events)
    }

    pub fn play_card(&mut self, player_id: &str, card: Card) -> Result<Vec<RoomEvent>, RulesError> {
        self.require_phase(Phase::Playing)?;
        let turn = self.turn_index.ok_or(RulesError::TurnLocked)?;
        let seat = self
            .seat_of(player_id)
            .ok_or_else(|| RulesError::UnknownPlayer(player_id.to_string()))?;
        if seat != turn {
            return Err(RulesError::OutOfTurn(player_id.to_string()));
        }

        let variant = self.variant;
        let trick = self.trick.clone();
        let player = self.player_mut(player_id)?;
        if !player.hand.contains(&card) {
            return Err(RulesError::CardNotInHand {
                player: player_id.to_string(),
                card: card.to_string(),
            });
        }
        if !is_valid_move_for(variant, &player.hand, &trick, &card) {
            return Err(RulesError::InvalidMove(card.to_string()));
        }
        player.hand.remove_card(&card);
        log::info!("{} played {card}", player.name);

        self.trick.push(Play::new(player_id, card));
        let mut events = vec![RoomEvent::CardPlayed {
            player_id: player_id.to_string(),
            card,
        }];
        if self.trick.len() < PLAYER_COUNT {
            self.turn_index = Some(next_turn(turn));
        } else {
            self.turn_index = None;
            events.push(RoomEvent::TrickLocked);
        }
        Ok(events)
    }

    /// Settles a locked trick: credits the winner, then either hands them the
    /// lead or, with every hand empty, scores the round.
    pub fn resolve_trick(&mut self) -> Result<Vec<RoomEvent>, RulesError> {
        self.require_phase(Phase::Playing)?;
        let winner_id = evaluate_trick(&self.trick)?;
        let seat = self
            .seat_of(&winner_id)
            .ok_or_else(|| RulesError::UnknownPlayer(winner_id.clone()))?;
        let winner = self.player_mut(&winner_id)?;
        winner.tricks_won += 1;
        log::info!("{} takes the trick ({} so far)", winner.name, winner.tricks_won);
        let mut events = vec![RoomEvent::TrickWon {
            player_id: winner_id,
            tricks_won: winner.tricks_won,
        }];
        self.trick.clear();
        debug_assert_eq!(self.cards_accounted(), DECK_SIZE);

        if self.round_complete() {
            events.push(self.score_round());
        } else {
            self.trick_starter = seat;
            self.turn_index = Some(seat);
        }
        Ok(events)
    }

    fn score_round(&mut self) -> RoomEvent {
        let deltas = self
            .players
            .values_mut()
            .map(|player| {
                let delta = round_score(player.bid.unwrap_or(0), player.tricks_won);
                player.score = accumulate(player.score, delta);
                (player.id.clone(), delta)
            })
            .collect_vec();
        self.phase = Phase::Scoring;
        log::info!(
            "Round {} scored: {}",
            self.round,
            deltas
                .iter()
                .map(|(id, delta)| format!("{id} {delta:+.1}"))
                .join(", ")
        );
        RoomEvent::RoundScored { deltas }
    }

    /// Leaves the scoreboard and deals again, moving the lead one seat along.
    pub fn next_round(&mut self, deck: &[Card]) -> Result<Vec<RoomEvent>, RulesError> {
        self.require_phase(Phase::Scoring)?;
        self.trick_starter = self.round as usize % PLAYER_COUNT;
        self.round += 1;
        Ok(vec![self.deal_round(deck)])
    }

    pub fn apply(&mut self, command: &Command) -> Result<Vec<RoomEvent>, RulesError> {
        match command {
            Command::Bid { player_id, bid } => self.place_bid(player_id, *bid),
            Command::Play { player_id, card } => self.play_card(player_id, *card),
        }
    }
}

impl Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let turn_str = self
            .turn_index
            .map_or_else(|| "locked".to_string(), |turn| turn.to_string());
        let trick_str = self.trick.iter().join(", ");
        let players_str = self
            .players
            .values()
            .map(|player| format!("{player}"))
            .join("\n");
        write!(
            f,
            "\n{} round {} turn {}\nTrick: [{}]\nTable:\n{}",
            self.phase, self.round, turn_str, trick_str, players_str
        )
    }
}

/// The room record stores a locked turn as `-1`.
mod turn_lock {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(turn: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match turn {
            Some(turn) => serializer.serialize_i64(*turn as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
