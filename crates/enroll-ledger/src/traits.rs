use async_trait::async_trait;

use enroll_types::{Address, LedgerCourseView, Receipt, TxHash};

use crate::credentials::Credentials;
use crate::error::LedgerError;
use crate::transaction::ContractAction;

/// What the enrollment coordinator needs from the remote contract.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Side-effect-free read of a course's live state.
    async fn read_course(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError>;

    /// Sign and transmit `action`, then wait until its receipt is observed.
    async fn submit(
        &self,
        action: &ContractAction,
        credentials: &Credentials,
    ) -> Result<Receipt, LedgerError>;
}

/// Node-level capability underneath a [`LedgerClient`]: contract calls,
/// account state, raw transaction submission, and receipt lookup.
#[async_trait]
pub trait ContractTransport: Send + Sync {
    async fn course_details(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError>;

    /// Number of transactions already accepted from `address`.
    async fn transaction_count(&self, address: &Address) -> Result<u64, LedgerError>;

    async fn gas_price(&self) -> Result<u64, LedgerError>;

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, LedgerError>;

    /// `None` while the transaction is still pending.
    async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>, LedgerError>;
}
