use enroll_chain::ChainError;

/// Errors that escape the coordinator.
///
/// Workflow failures are [`crate::Outcome`] values, not errors. What remains
/// here means the local state itself can no longer be trusted.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("audit chain integrity violated: {0}")]
    Integrity(#[from] ChainError),
}

pub type CoreResult<T> = Result<T, CoreError>;
