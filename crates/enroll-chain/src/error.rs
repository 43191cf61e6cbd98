/// Errors from chain construction and verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis block does not match the fixed genesis definition")]
    InvalidGenesis,

    #[error("index mismatch at position {position}: block claims index {found}")]
    IndexMismatch { position: usize, found: u64 },

    #[error("broken link at index {index}: previous_hash does not match")]
    BrokenLink { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },

    #[error("cannot rebuild a chain from an empty block sequence")]
    Empty,

    #[error("serialization error: {0}")]
    Serialization(String),
}
