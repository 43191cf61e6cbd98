//! Local audit chain for the course enrollment ledger.
//!
//! Every enrollment the remote ledger confirms is sealed into a block whose
//! hash covers its index, its predecessor's hash, and a canonical (sorted-key,
//! compact) JSON rendering of its payload. [`HashChain::verify`] recomputes
//! the whole chain and is the one self-contained integrity check of the
//! service.

pub mod block;
pub mod chain;
pub mod error;

pub use block::{canonical_string, compute_hash, Block, GENESIS_INFO, GENESIS_PREVIOUS_HASH};
pub use chain::HashChain;
pub use error::ChainError;
