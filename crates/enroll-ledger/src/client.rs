use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use enroll_types::{Address, LedgerCourseView, Receipt, TxHash};

use crate::config::LedgerConfig;
use crate::credentials::Credentials;
use crate::error::LedgerError;
use crate::traits::{ContractTransport, LedgerClient};
use crate::transaction::{ContractAction, SignedTransaction, TransactionRequest};

/// [`LedgerClient`] over a [`ContractTransport`].
///
/// Builds, signs, and submits transactions, then polls for the receipt. It
/// tracks the last nonce it issued per sender so back-to-back submissions
/// from one account never reuse a nonce while the remote count lags.
pub struct ContractClient<T> {
    transport: T,
    config: LedgerConfig,
    nonces: Mutex<HashMap<Address, u64>>,
}

impl<T: ContractTransport> ContractClient<T> {
    pub fn new(transport: T, config: LedgerConfig) -> Self {
        Self {
            transport,
            config,
            nonces: Mutex::new(HashMap::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Reserve the next nonce for `sender`.
    ///
    /// The reservation is undone when the returned guard drops uncommitted,
    /// which covers both error returns and a cancelled submission.
    async fn reserve_nonce(
        &self,
        sender: &Address,
    ) -> Result<NonceReservation<'_>, LedgerError> {
        let remote = self.transport.transaction_count(sender).await?;
        let mut issued = lock_nonces(&self.nonces)?;
        let previous = issued.get(sender).copied();
        let nonce = match previous {
            Some(last) => remote.max(last + 1),
            None => remote,
        };
        issued.insert(*sender, nonce);
        Ok(NonceReservation {
            nonces: &self.nonces,
            sender: *sender,
            nonce,
            previous,
            committed: false,
        })
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, LedgerError> {
        let timeout = self.config.receipt_timeout();
        match tokio::time::timeout(timeout, self.poll_receipt(tx_hash)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(tx = %tx_hash, ?timeout, "receipt wait timed out");
                Err(LedgerError::Timeout(timeout))
            }
        }
    }

    async fn poll_receipt(&self, tx_hash: &TxHash) -> Result<Receipt, LedgerError> {
        let interval = self.config.poll_interval();
        loop {
            if let Some(receipt) = self.transport.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[async_trait]
impl<T: ContractTransport> LedgerClient for ContractClient<T> {
    async fn read_course(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError> {
        self.transport.course_details(code).await
    }

    async fn submit(
        &self,
        action: &ContractAction,
        credentials: &Credentials,
    ) -> Result<Receipt, LedgerError> {
        let from = credentials.address();
        let gas_price = match self.config.gas_price {
            Some(price) => price,
            None => self.transport.gas_price().await?,
        };

        let reservation = self.reserve_nonce(&from).await?;
        let nonce = reservation.nonce;
        let request = TransactionRequest {
            from,
            nonce,
            gas_limit: self.config.gas_limit,
            gas_price,
            action: action.clone(),
        };
        let raw = SignedTransaction::sign(request, credentials)?.encode()?;

        let tx_hash = self.transport.send_raw_transaction(&raw).await?;
        reservation.commit();
        debug!(tx = %tx_hash, %action, sender = %from.short_hex(), nonce, "transaction sent");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        info!(
            tx = %tx_hash,
            %action,
            status = %receipt.status,
            block = receipt.block_number,
            "receipt observed"
        );
        Ok(receipt)
    }
}

/// Nonce held for one in-flight submission.
struct NonceReservation<'a> {
    nonces: &'a Mutex<HashMap<Address, u64>>,
    sender: Address,
    nonce: u64,
    previous: Option<u64>,
    committed: bool,
}

impl NonceReservation<'_> {
    /// The ledger accepted the transaction; keep the nonce.
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for NonceReservation<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match lock_nonces(self.nonces) {
            // A later reservation owns the entry now; leave it alone.
            Ok(mut issued) if issued.get(&self.sender) == Some(&self.nonce) => {
                match self.previous {
                    Some(previous) => issued.insert(self.sender, previous),
                    None => issued.remove(&self.sender),
                };
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "could not release nonce"),
        }
    }
}

fn lock_nonces(
    nonces: &Mutex<HashMap<Address, u64>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<Address, u64>>, LedgerError> {
    nonces
        .lock()
        .map_err(|_| LedgerError::Transport("nonce tracker lock poisoned".into()))
}
