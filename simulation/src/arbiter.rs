use rand::{rngs::StdRng, SeedableRng};
use types::{shuffled_deck, Phase, Room, RoomEvent};

use crate::{RoomSnapshot, Session, SessionError, SimulationConfig};

/// The single writer of room state. Runs inside whichever client holds the
/// lowest id; every other client only appends commands.
#[derive(Debug)]
pub struct Arbiter {
    room: Option<Room>,
    rng: StdRng,
    config: SimulationConfig,
}

impl Arbiter {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            room: None,
            rng,
            config,
        }
    }

    /// The authoritative room, once the game has started.
    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    /// Folds one observed snapshot into the authoritative room and publishes
    /// every resulting state. Stale snapshots are harmless: only commands past
    /// the local cursor are looked at.
    pub async fn step(
        &mut self,
        session: &Session,
        snapshot: &RoomSnapshot,
    ) -> Result<(), SessionError> {
        if self.room.is_none() {
            if !snapshot.room.ready_to_start() {
                return Ok(());
            }
            let mut room = snapshot.room.clone();
            let deck = shuffled_deck(&mut self.rng);
            log_events(&room.start_game(&deck)?);
            session.publish(&room, &[]).await?;
            self.room = Some(room);
        }
        let Some(room) = self.room.as_mut() else {
            return Ok(());
        };

        for (seq, command) in snapshot.pending(room.applied) {
            match command.map(|command| (command, room.apply(command))) {
                Some((_, Ok(events))) => log_events(&events),
                Some((command, Err(err))) => {
                    log::warn!("Rejected command #{seq} ({command}): {err}")
                }
                None => log::warn!("Skipping undecodable command #{seq}"),
            }
            room.applied = seq;
            session.publish(room, &[seq]).await?;

            if room.phase == Phase::Playing && room.is_turn_locked() {
                settle_trick(room, session, &self.config, &mut self.rng).await?;
            }
        }
        Ok(())
    }
}

/// Leaves a full trick on the table for a moment, collects it, and rolls the
/// round over once the hands are empty.
async fn settle_trick(
    room: &mut Room,
    session: &Session,
    config: &SimulationConfig,
    rng: &mut StdRng,
) -> Result<(), SessionError> {
    pause(config.trick_delay()).await;
    log_events(&room.resolve_trick()?);
    session.publish(room, &[]).await?;

    if room.phase != Phase::Scoring || config.is_finished(room) {
        return Ok(());
    }
    pause(config.round_pause()).await;
    let deck = shuffled_deck(rng);
    log_events(&room.next_round(&deck)?);
    session.publish(room, &[]).await
}

async fn pause(duration: std::time::Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn log_events(events: &[RoomEvent]) {
    for event in events {
        log::debug!("{event:?}");
    }
}
