use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use store::StoreConfig;
use types::{Phase, Room, Variant};

use crate::SessionError;

/// Timing and table settings shared by every client at the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// How long a completed trick stays on the table before it is collected.
    pub trick_delay_ms: u64,
    /// Pause between scoring a round and dealing the next one.
    pub round_pause_ms: u64,
    /// Stop after this many rounds; `None` plays forever.
    pub rounds: Option<u32>,
    pub variant: Variant,
    /// Room codes tried before giving up on `create_room`.
    pub create_attempts: usize,
    pub store: StoreConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trick_delay_ms: 1500,
            round_pause_ms: 2000,
            rounds: None,
            variant: Variant::default(),
            create_attempts: 10,
            store: StoreConfig::default(),
        }
    }
}

/// Values given on the command line. Anything set here beats the environment and the file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub trick_delay_ms: Option<u64>,
    pub round_pause_ms: Option<u64>,
    pub rounds: Option<u32>,
    pub variant: Option<Variant>,
    pub store_retries: Option<usize>,
}

impl SimulationConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, SessionError> {
        serde_yaml::from_str(raw).map_err(|err| SessionError::Config(err.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, SessionError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| SessionError::Config(format!("{}: {err}", path.display())))?;
        Self::from_yaml_str(&raw)
    }

    /// CLI beats `CALLBREAK_*` environment variables, which beat the YAML file,
    /// which beats the defaults.
    pub fn from_cli_or_env_or_yaml(
        cli: ConfigOverrides,
        yaml: Option<&Path>,
    ) -> Result<Self, SessionError> {
        let base = match yaml {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let mut config = base.with_env_overrides(|key| std::env::var(key).ok())?;

        if let Some(ms) = cli.trick_delay_ms {
            config.trick_delay_ms = ms;
        }
        if let Some(ms) = cli.round_pause_ms {
            config.round_pause_ms = ms;
        }
        if let Some(rounds) = cli.rounds {
            config.rounds = Some(rounds);
        }
        if let Some(variant) = cli.variant {
            config.variant = variant;
        }
        config.store = config
            .store
            .with_args_or_env(cli.store_retries, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `CALLBREAK_TRICK_DELAY_MS`, `CALLBREAK_ROUND_PAUSE_MS`,
    /// `CALLBREAK_ROUNDS` and `CALLBREAK_VARIANT` as read through `lookup`.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SessionError> {
        if let Some(raw) = lookup("CALLBREAK_TRICK_DELAY_MS") {
            self.trick_delay_ms = parse_env("CALLBREAK_TRICK_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("CALLBREAK_ROUND_PAUSE_MS") {
            self.round_pause_ms = parse_env("CALLBREAK_ROUND_PAUSE_MS", &raw)?;
        }
        if let Some(raw) = lookup("CALLBREAK_ROUNDS") {
            self.rounds = Some(parse_env("CALLBREAK_ROUNDS", &raw)?);
        }
        if let Some(raw) = lookup("CALLBREAK_VARIANT") {
            self.variant = serde_yaml::from_str(&raw)
                .map_err(|err| SessionError::Config(format!("CALLBREAK_VARIANT={raw}: {err}")))?;
        }
        Ok(self)
    }

    pub fn trick_delay(&self) -> Duration {
        Duration::from_millis(self.trick_delay_ms)
    }

    pub fn round_pause(&self) -> Duration {
        Duration::from_millis(self.round_pause_ms)
    }

    /// The table is done once the last configured round has been scored.
    pub fn is_finished(&self, room: &Room) -> bool {
        self.rounds
            .is_some_and(|max| room.phase == Phase::Scoring && room.round >= max)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SessionError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err| SessionError::Config(format!("{key}={raw}: {err}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let config = SimulationConfig::from_yaml_str(
            "trick_delay_ms: 0\nrounds: 3\nvariant: MUST_OVERTAKE\n",
        )
        .unwrap();
        assert_eq!(config.trick_delay_ms, 0);
        assert_eq!(config.round_pause_ms, 2000);
        assert_eq!(config.rounds, Some(3));
        assert_eq!(config.variant, Variant::MustOvertake);
        assert_eq!(config.create_attempts, 10);
    }

    #[test]
    fn bad_yaml_is_a_config_error() {
        assert!(matches!(
            SimulationConfig::from_yaml_str("rounds: lots"),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn env_overrides_yaml_values() {
        let env: HashMap<&str, &str> = [
            ("CALLBREAK_ROUND_PAUSE_MS", "5"),
            ("CALLBREAK_ROUNDS", "2"),
            ("CALLBREAK_VARIANT", "FOLLOW_SUIT"),
        ]
        .into_iter()
        .collect();
        let config = SimulationConfig::from_yaml_str("round_pause_ms: 900\nvariant: MUST_OVERTAKE")
            .unwrap()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.round_pause_ms, 5);
        assert_eq!(config.rounds, Some(2));
        assert_eq!(config.variant, Variant::FollowSuit);
    }

    #[test]
    fn unparsable_env_value_is_rejected() {
        let result = SimulationConfig::default()
            .with_env_overrides(|key| (key == "CALLBREAK_TRICK_DELAY_MS").then(|| "soon".into()));
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn finished_only_after_last_round_is_scored() {
        let config = SimulationConfig {
            rounds: Some(2),
            ..Default::default()
        };
        let mut room = Room::default();
        room.phase = Phase::Scoring;
        room.round = 1;
        assert!(!config.is_finished(&room));
        room.round = 2;
        assert!(config.is_finished(&room));
        room.phase = Phase::Bidding;
        assert!(!config.is_finished(&room));
        assert!(!SimulationConfig::default().is_finished(&Room::default()));
    }
}
