//! Boundary to the remote, authoritative enrollment contract.
//!
//! This crate provides:
//! - The [`LedgerClient`] trait the coordinator depends on (read a course,
//!   submit an action and wait for its receipt)
//! - The lower-level [`ContractTransport`] trait a node connection implements
//! - [`ContractClient`], which adds transaction building, ed25519 signing,
//!   nonce tracking, fee parameters, and a bounded receipt wait
//! - [`InMemoryContract`], a deterministic local devnet for tests and demos

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod traits;
pub mod transaction;

pub use client::ContractClient;
pub use config::LedgerConfig;
pub use credentials::Credentials;
pub use error::LedgerError;
pub use memory::InMemoryContract;
pub use traits::{ContractTransport, LedgerClient};
pub use transaction::{ContractAction, SignedTransaction, TransactionRequest};
