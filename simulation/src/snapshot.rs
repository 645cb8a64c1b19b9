use std::collections::BTreeMap;

use serde_json::Value;
use types::{Command, Room};

use crate::SessionError;

/// A room record as one subscriber saw it: the shared state plus whatever
/// commands are still waiting in the log. Entries that fail to decode are kept
/// as `None` so they still occupy their sequence number.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    pub room: Room,
    pub commands: BTreeMap<u64, Option<Command>>,
}

impl RoomSnapshot {
    pub fn parse(value: Value) -> Result<Self, SessionError> {
        let commands = match value.get("commands") {
            Some(Value::Object(entries)) => entries
                .iter()
                .filter_map(|(key, raw)| {
                    let Ok(seq) = key.parse::<u64>() else {
                        log::warn!("Ignoring command with non-numeric key {key:?}");
                        return None;
                    };
                    match serde_json::from_value::<Command>(raw.clone()) {
                        Ok(command) => Some((seq, Some(command))),
                        Err(err) => {
                            log::warn!("Malformed command #{seq}: {err}");
                            Some((seq, None))
                        }
                    }
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        let room = serde_json::from_value(value)?;
        Ok(Self { room, commands })
    }

    /// Commands that directly follow `applied`, stopping at the first gap.
    pub fn pending(&self, applied: u64) -> impl Iterator<Item = (u64, Option<&Command>)> {
        self.commands
            .range(applied + 1..)
            .zip(applied + 1..)
            .take_while(|((seq, _), expected)| *seq == expected)
            .map(|((seq, command), _)| (*seq, command.as_ref()))
    }
}
