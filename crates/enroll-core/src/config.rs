use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounds on ledger calls made while the coordinator lock is held.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound on a submit-and-wait-for-receipt round trip.
    pub submit_timeout_ms: u64,
    /// Upper bound on a single course read.
    pub read_timeout_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            submit_timeout_ms: 180_000,
            read_timeout_ms: 10_000,
        }
    }
}

impl CoordinatorConfig {
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds() {
        let c = CoordinatorConfig::default();
        assert_eq!(c.submit_timeout(), Duration::from_secs(180));
        assert_eq!(c.read_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let c: CoordinatorConfig = serde_json::from_str(r#"{"submit_timeout_ms": 5}"#).unwrap();
        assert_eq!(c.submit_timeout_ms, 5);
        assert_eq!(c.read_timeout_ms, 10_000);
    }
}
