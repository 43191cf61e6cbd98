use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fee and receipt-wait parameters for [`crate::ContractClient`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Gas limit attached to every transaction.
    pub gas_limit: u64,
    /// Fixed gas price. When unset the transport's current price is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// How long to wait for a receipt before giving up.
    pub receipt_timeout_ms: u64,
    /// Delay between receipt lookups.
    pub poll_interval_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            gas_limit: 3_000_000,
            gas_price: None,
            receipt_timeout_ms: 120_000,
            poll_interval_ms: 500,
        }
    }
}

impl LedgerConfig {
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
