//! Foundation types for the course enrollment ledger.
//!
//! Every other `enroll-*` crate depends on `enroll-types`.
//!
//! # Key Types
//!
//! - [`Student`] / [`Course`] — entries of the coordinator's local cache
//! - [`LedgerCourseView`] — authoritative course state read from the contract
//! - [`CourseSummary`] — the listing shape returned to clients
//! - [`Address`] — 20-byte ledger account identifier
//! - [`Receipt`] / [`TxHash`] — the ledger's finality signal
//! - [`EnrollmentRecord`] — payload of an audit chain block

pub mod address;
pub mod error;
pub mod model;
pub mod receipt;

pub use address::{strip_hex_prefix, Address};
pub use error::TypeError;
pub use model::{Course, CourseSummary, EnrollmentRecord, LedgerCourseView, Student};
pub use receipt::{Receipt, ReceiptStatus, TxHash};
