use std::time::Duration;

/// Errors produced at the ledger boundary.
///
/// Any of these means the ledger did not confirm the requested effect. A fee
/// may still have been spent remotely; callers never attempt compensation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction rejected: {reason}")]
    Rejected { reason: String },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("signature does not verify for the sending address")]
    InvalidSignature,

    #[error("nonce mismatch: expected {expected}, got {found}")]
    NonceMismatch { expected: u64, found: u64 },

    #[error("no receipt observed within {0:?}")]
    Timeout(Duration),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}
