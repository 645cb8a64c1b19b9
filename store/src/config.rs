use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 50,
        }
    }
}

impl StoreConfig {
    /// An explicit `retries` wins over `CALLBREAK_STORE_RETRIES` (read through
    /// `lookup`), which wins over what the config already holds.
    pub fn with_args_or_env(
        mut self,
        retries: Option<usize>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(arg) = retries {
            self.retries = arg;
        } else if let Some(env) = lookup("CALLBREAK_STORE_RETRIES").and_then(|v| v.trim().parse().ok())
        {
            self.retries = env;
        }
        self
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
