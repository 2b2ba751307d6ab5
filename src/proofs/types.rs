//! Proof record types.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Lifecycle of a submitted proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProofStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Attested on-chain.
    Attested { tx_hash: String },
    /// Rejected by the admin.
    Rejected,
}

/// A participant's claim of task completion, awaiting attestation.
///
/// The screenshot itself lives with the file-storage collaborator;
/// only its handle is recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRecord {
    pub id: Uuid,
    pub user_address: Address,
    pub task_id: String,
    /// Opaque handle returned by the file-storage collaborator.
    pub proof_handle: String,
    /// Seconds since epoch at registration time.
    pub submitted_at: u64,
    pub status: ProofStatus,
}

impl ProofRecord {
    /// Create a fresh pending record.
    pub fn new(user_address: Address, task_id: String, proof_handle: String) -> Self {
        let submitted_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Self {
            id: Uuid::new_v4(),
            user_address,
            task_id,
            proof_handle,
            submitted_at,
            status: ProofStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProofStatus::Pending
    }
}
