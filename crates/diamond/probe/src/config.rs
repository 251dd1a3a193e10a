//! Probe configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-call timeout and retry budget for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Timeout for a single probe call in milliseconds
    pub timeout_ms: u64,

    /// Extra attempts after a timeout or transport failure
    pub retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retries: 2,
            retry_delay_ms: 250,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Single attempt, no retries.
    pub fn no_retry(mut self) -> Self {
        self.retries = 0;
        self
    }
}
