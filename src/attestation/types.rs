//! Attestation pipeline types and error taxonomy.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::{ChainError, SignerError};

/// An inbound admin verification decision.
///
/// Immutable once created and consumed exactly once by the pipeline.
/// Deserialization validates the address as a well-formed 20-byte hex
/// account identifier before any component sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationRequest {
    /// Participant account the attestation is for.
    pub user_address: Address,
    /// Campaign task identifier (e.g. "twitter_follow_1").
    pub task_id: String,
    /// The admin's decision: task completed or not.
    pub verified: bool,
}

/// A gas limit / gas price pairing for one submission.
///
/// Ephemeral: fetched fresh for every submission and never reused, so a
/// stale price can never ride along on a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    /// Upper bound on gas the call may consume.
    pub gas_limit: u64,
    /// Fee per gas unit in wei, already scaled by the safety multiplier.
    pub gas_price: u128,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct AttestationResult {
    /// Hash of the broadcast transaction.
    pub transaction_hash: TxHash,
    /// The node accepted the payload into its pending pool. Block
    /// confirmation is explicitly not tracked here.
    pub accepted: bool,
}

/// Everything that can go wrong between an admin decision and a pending
/// transaction. Errors are never collapsed into a generic failure: the
/// caller must be able to tell "task not completed" apart from
/// "submission to chain failed".
#[derive(Debug, Error)]
pub enum AttestationError {
    /// Authorization token mismatch. No chain interaction was attempted.
    #[error("unauthorized")]
    Unauthorized,

    /// The contract would revert this call (e.g. task already
    /// verified). Logical rejection, not retried.
    #[error("contract rejected the call: {0}")]
    EstimationFailed(String),

    /// Transient chain failure; retry with a freshly built transaction.
    #[error(transparent)]
    Chain(ChainError),

    /// Bad key material or an unsignable transaction. Halts further
    /// processing until operator intervention.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Network gas price spiked above the configured ceiling.
    #[error("gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },
}

impl AttestationError {
    /// Whether a fresh submission attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AttestationError::Chain(e) => e.is_retryable(),
            AttestationError::GasPriceTooHigh { .. } => true,
            _ => false,
        }
    }

    /// Stable label for the attestation outcome metric.
    pub fn metric_label(&self) -> &'static str {
        match self {
            AttestationError::Unauthorized => "unauthorized",
            AttestationError::EstimationFailed(_) => "estimation_failed",
            AttestationError::Chain(_) => "chain_error",
            AttestationError::SigningFailed(_) => "signing_failed",
            AttestationError::GasPriceTooHigh { .. } => "gas_price_too_high",
        }
    }
}

impl From<ChainError> for AttestationError {
    fn from(e: ChainError) -> Self {
        match e {
            // A simulated revert is a logical rejection by the
            // contract, surfaced under its own taxonomy entry.
            ChainError::EstimationFailed(reason) => AttestationError::EstimationFailed(reason),
            other => AttestationError::Chain(other),
        }
    }
}

impl From<SignerError> for AttestationError {
    fn from(e: SignerError) -> Self {
        AttestationError::SigningFailed(e.0)
    }
}

/// Result type for pipeline operations.
pub type AttestationOutcome = Result<AttestationResult, AttestationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_error_mapping() {
        let mapped = AttestationError::from(ChainError::EstimationFailed("revert".into()));
        assert!(matches!(mapped, AttestationError::EstimationFailed(_)));

        let mapped = AttestationError::from(ChainError::Connection("refused".into()));
        assert!(matches!(
            mapped,
            AttestationError::Chain(ChainError::Connection(_))
        ));
    }

    #[test]
    fn test_retryability() {
        assert!(AttestationError::Chain(ChainError::Timeout(5)).is_retryable());
        assert!(AttestationError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500
        }
        .is_retryable());
        assert!(!AttestationError::Unauthorized.is_retryable());
        assert!(!AttestationError::EstimationFailed("revert".into()).is_retryable());
        assert!(!AttestationError::SigningFailed("bad key".into()).is_retryable());
    }

    #[test]
    fn test_request_deserialization_validates_address() {
        let ok: Result<VerificationRequest, _> = serde_json::from_str(
            r#"{"user_address":"0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266","task_id":"twitter_follow_1","verified":true}"#,
        );
        assert!(ok.is_ok());

        let bad: Result<VerificationRequest, _> = serde_json::from_str(
            r#"{"user_address":"0x1234","task_id":"twitter_follow_1","verified":true}"#,
        );
        assert!(bad.is_err());
    }
}
