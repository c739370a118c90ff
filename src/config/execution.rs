//! Execution configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Order execution settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionConfig {
    /// Maximum time to wait for the execution port before treating the
    /// order as timed out (default: 30s).
    #[serde(default, with = "duration")]
    pub timeout: Duration,
    /// Orders pending longer than this are force-timed-out by the
    /// watchdog sweep (default: 2m).
    #[serde(default, with = "duration")]
    pub max_pending_age: Duration,
}

impl ExecutionConfig {
    /// Execution timeout with the default applied when unset.
    pub fn timeout(&self) -> Duration {
        if self.timeout.is_zero() {
            Duration::from_secs(30)
        } else {
            self.timeout
        }
    }

    /// Watchdog age limit with the default applied when unset.
    pub fn max_pending_age(&self) -> Duration {
        if self.max_pending_age.is_zero() {
            Duration::from_secs(120)
        } else {
            self.max_pending_age
        }
    }
}
