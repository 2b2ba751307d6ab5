//! Proof record persistence.
//!
//! The pipeline only knows the [`ProofStore`] interface; the backing
//! technology (in-memory map, document store) is a deployment choice.

use alloy::primitives::Address;
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::proofs::types::{ProofRecord, ProofStatus};

/// Errors from the proof store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no proof record matches {user}/{task_id}")]
    NotFound { user: Address, task_id: String },

    #[error("proof store backend error: {0}")]
    Backend(String),
}

/// Storage interface for proof records and attestation history.
#[async_trait]
pub trait ProofStore: Send + Sync {
    /// Register a participant's proof, returning its id.
    async fn record_pending(&self, record: ProofRecord) -> Result<Uuid, StoreError>;

    /// All records still awaiting an admin decision.
    async fn find_pending(&self) -> Result<Vec<ProofRecord>, StoreError>;

    /// Record the attestation outcome for every pending record of the
    /// given `(user, task)` pair.
    async fn record_result(
        &self,
        user: Address,
        task_id: &str,
        status: ProofStatus,
    ) -> Result<(), StoreError>;
}

/// Thread-safe in-memory store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryProofStore {
    records: DashMap<Uuid, ProofRecord>,
}

impl MemoryProofStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ProofStore for MemoryProofStore {
    async fn record_pending(&self, record: ProofRecord) -> Result<Uuid, StoreError> {
        let id = record.id;
        self.records.insert(id, record);
        Ok(id)
    }

    async fn find_pending(&self) -> Result<Vec<ProofRecord>, StoreError> {
        let mut pending: Vec<ProofRecord> = self
            .records
            .iter()
            .filter(|entry| entry.is_pending())
            .map(|entry| entry.value().clone())
            .collect();
        pending.sort_by_key(|r| r.submitted_at);
        Ok(pending)
    }

    async fn record_result(
        &self,
        user: Address,
        task_id: &str,
        status: ProofStatus,
    ) -> Result<(), StoreError> {
        let mut updated = false;
        for mut entry in self.records.iter_mut() {
            if entry.user_address == user && entry.task_id == task_id && entry.is_pending() {
                entry.status = status.clone();
                updated = true;
            }
        }

        if updated {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                user,
                task_id: task_id.to_string(),
            })
        }
    }
}
