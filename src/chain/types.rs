//! Chain-specific types and error definitions.

use thiserror::Error;

// Re-export ChainConfig from the config module to avoid duplication
pub use crate::config::schema::ChainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors produced by RPC interaction with the chain.
///
/// `Connection`, `Timeout` and `BroadcastRejected` are transient: the
/// caller may retry with a freshly built transaction. `EstimationFailed`
/// is a logical rejection by the contract and must not be retried.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC transport failure (unreachable node, malformed response).
    #[error("RPC connection error: {0}")]
    Connection(String),

    /// RPC request exceeded its deadline.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node simulated the call and reported it would revert.
    #[error("gas estimation failed: {0}")]
    EstimationFailed(String),

    /// The node refused the signed payload (underpriced, nonce conflict).
    #[error("broadcast rejected: {0}")]
    BroadcastRejected(String),
}

impl ChainError {
    /// Whether a fresh submission attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ChainError::EstimationFailed(_))
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
