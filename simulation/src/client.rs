use tokio::runtime::{Handle, RuntimeFlavor};
use types::{legal_cards, rules::is_valid_bid, Command, Phase, Room, Strategy};

use crate::{Arbiter, RoomSnapshot, Session, SessionError, SimulationConfig};

/// Identifies the decision a proposal answered, so a seat never proposes twice
/// for the same turn while its command waits in the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Decision {
    Bid { round: u32 },
    Play { round: u32, cards_left: usize },
}

/// The player half of a client: watches for its own turn and proposes moves.
#[derive(Debug)]
pub struct Seat {
    strategy: Box<dyn Strategy>,
    last_decision: Option<Decision>,
}

impl Seat {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        Self {
            strategy,
            last_decision: None,
        }
    }

    /// Proposes a bid or a card when the room is waiting on this seat.
    /// Moves the local rules reject are dropped without touching the store.
    /// A strategy that gives up ends the session with `SeatAbandoned`.
    pub async fn act(&mut self, session: &Session, room: &Room) -> Result<(), SessionError> {
        let Some(me) = room.player(&session.client_id) else {
            return Ok(());
        };
        let decision = match room.phase {
            Phase::Bidding if !me.has_bid() => Decision::Bid { round: room.round },
            Phase::Playing if room.current_player_id() == Some(me.id.as_str()) => {
                Decision::Play {
                    round: room.round,
                    cards_left: me.hand.len(),
                }
            }
            _ => return Ok(()),
        };
        if self.last_decision == Some(decision) {
            return Ok(());
        }

        let abandoned = || SessionError::SeatAbandoned(me.name.clone());
        let strategy = &mut self.strategy;
        let command = match decision {
            Decision::Bid { .. } => {
                let bid = blocking(|| strategy.select_bid(me, room)).ok_or_else(abandoned)?;
                if !is_valid_bid(bid) {
                    log::warn!("{} chose an invalid bid {bid}, not sending it", me.name);
                    return Ok(());
                }
                Command::Bid {
                    player_id: me.id.clone(),
                    bid,
                }
            }
            Decision::Play { .. } => {
                let legal = legal_cards(room.variant, &me.hand, &room.trick);
                if legal.is_empty() {
                    return Ok(());
                }
                let card =
                    blocking(|| strategy.select_card(me, room, &legal)).ok_or_else(abandoned)?;
                if !legal.contains(&card) {
                    log::warn!("{} chose {card}, which is not playable, not sending it", me.name);
                    return Ok(());
                }
                Command::Play {
                    player_id: me.id.clone(),
                    card,
                }
            }
        };

        session.propose(&command).await?;
        self.last_decision = Some(decision);
        Ok(())
    }
}

/// Strategies may block on a terminal. Off a multi-threaded runtime there is
/// no worker to hand off to, so the call runs inline.
fn blocking<T>(decide: impl FnOnce() -> T) -> T {
    match Handle::try_current().map(|handle| handle.runtime_flavor()) {
        Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(decide),
        _ => decide(),
    }
}

/// Drives one client until the table finishes or the room disappears. The
/// client with the lowest id also runs the arbiter.
pub async fn run_client(
    session: Session,
    strategy: Box<dyn Strategy>,
    config: SimulationConfig,
) -> Result<Room, SessionError> {
    let mut subscription = session.store().subscribe(&session.room_path()).await?;
    let mut arbiter = Arbiter::new(config.clone());
    let mut seat = Seat::new(strategy);
    let mut seen_room = false;

    loop {
        let Some(value) = subscription.latest().await? else {
            log::info!("{}: room {} is gone", session.name, session.room_id);
            return Err(SessionError::RoomClosed(session.room_id.clone()));
        };
        let snapshot = match RoomSnapshot::parse(value) {
            Ok(snapshot) => snapshot,
            // a room that decoded before and no longer does was removed under us
            Err(SessionError::Decode(err)) if seen_room => {
                log::warn!("{}: room {} lost its state: {err}", session.name, session.room_id);
                return Err(SessionError::RoomClosed(session.room_id.clone()));
            }
            Err(err) => return Err(err),
        };
        seen_room = true;

        if snapshot.room.is_host(&session.client_id) {
            arbiter.step(&session, &snapshot).await?;
        }
        if config.is_finished(&snapshot.room) {
            log::info!("{}: table finished after round {}", session.name, snapshot.room.round);
            return Ok(snapshot.room);
        }
        if let Err(err) = seat.act(&session, &snapshot.room).await {
            if matches!(err, SessionError::SeatAbandoned(_)) {
                // the leave hook closes the room for the rest of the table
                session.leave().await?;
            }
            return Err(err);
        }
    }
}
