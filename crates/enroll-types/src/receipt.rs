use std::fmt;

use serde::{Deserialize, Serialize};

/// Transaction identifier as reported by the ledger.
///
/// Kept opaque: remote nodes are free to choose their own encoding. Hashes
/// computed locally use [`TxHash::from_digest`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `0x`-prefixed hex of a 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TxHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Binary execution status of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Failure,
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// The ledger's finality signal for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: ReceiptStatus,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
}

impl Receipt {
    pub fn success(tx_hash: impl Into<TxHash>) -> Self {
        Self {
            status: ReceiptStatus::Success,
            tx_hash: tx_hash.into(),
            block_number: 0,
            gas_used: 0,
        }
    }

    pub fn failure(tx_hash: impl Into<TxHash>) -> Self {
        Self {
            status: ReceiptStatus::Failure,
            ..Self::success(tx_hash)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
