//! Orchestration of the attestation pipeline.
//!
//! # Sequencing
//! authorize → prepare (encode + gas quote) → [nonce lock: pending
//! nonce → seal → broadcast]. Each stage's failure short-circuits the
//! rest; either a signed transaction is broadcast and its hash
//! returned, or nothing was sent and a typed error comes back.
//!
//! # Concurrency
//! Gas pricing and estimation for different requests run in parallel.
//! Nonce allocation through broadcast is serialized under a mutex
//! scoped to the admin key, so two in-flight submissions can never
//! read the same pending nonce and both attempt to use it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::admin::auth::authorize;
use crate::attestation::builder::AttestationBuilder;
use crate::attestation::types::{
    AttestationError, AttestationOutcome, AttestationResult, VerificationRequest,
};
use crate::chain::{ChainError, ChainRpc};
use crate::config::schema::RetryConfig;
use crate::resilience::backoff::backoff_delay;

/// One-shot submitter turning admin decisions into pending transactions.
pub struct AttestationSubmitter {
    builder: AttestationBuilder,
    chain: Arc<dyn ChainRpc>,
    admin_secret: String,
    /// Single-writer discipline over nonce allocation for the admin key.
    nonce_lock: Mutex<()>,
    /// Set after a signing failure; cleared only by operator action.
    halted: AtomicBool,
    submit_timeout: Duration,
    retries: RetryConfig,
}

impl AttestationSubmitter {
    /// Create a submitter.
    pub fn new(
        builder: AttestationBuilder,
        chain: Arc<dyn ChainRpc>,
        admin_secret: String,
        submit_timeout_secs: u64,
        retries: RetryConfig,
    ) -> Self {
        Self {
            builder,
            chain,
            admin_secret,
            nonce_lock: Mutex::new(()),
            halted: AtomicBool::new(false),
            submit_timeout: Duration::from_secs(submit_timeout_secs),
            retries,
        }
    }

    /// Submit one verification decision to the chain.
    ///
    /// The whole call is bounded by the configured submit timeout; on
    /// expiry the caller gets `Chain(Timeout)`. A payload broadcast
    /// before the deadline stays pending on-chain regardless —
    /// broadcast is not cancellable once sent.
    pub async fn submit(&self, request: &VerificationRequest, token: &str) -> AttestationOutcome {
        authorize(token.as_bytes(), self.admin_secret.as_bytes())?;

        if self.halted.load(Ordering::SeqCst) {
            return Err(AttestationError::SigningFailed(
                "submitter halted after a signing failure; operator intervention required"
                    .to_string(),
            ));
        }

        let result = match timeout(self.submit_timeout, self.submit_inner(request)).await {
            Ok(result) => result,
            Err(_) => Err(AttestationError::Chain(ChainError::Timeout(
                self.submit_timeout.as_secs(),
            ))),
        };

        if let Err(AttestationError::SigningFailed(reason)) = &result {
            tracing::error!(reason = %reason, "Signing failed, halting further submissions");
            self.halted.store(true, Ordering::SeqCst);
        }

        result
    }

    /// Submit with automatic retries for transient failures.
    ///
    /// Each attempt is a full fresh submission: new gas quote, new
    /// pending nonce. A stale signed transaction is never rebroadcast,
    /// since its nonce may already have been consumed.
    pub async fn submit_with_retry(
        &self,
        request: &VerificationRequest,
        token: &str,
    ) -> AttestationOutcome {
        let max_attempts = if self.retries.enabled {
            self.retries.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.submit(request, token).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay =
                        backoff_delay(attempt, self.retries.base_delay_ms, self.retries.max_delay_ms);
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient submission failure, retrying with fresh nonce and gas quote"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn submit_inner(&self, request: &VerificationRequest) -> AttestationOutcome {
        let plan = self
            .builder
            .prepare(request.user_address, &request.task_id, request.verified)
            .await?;

        // Nonce read, signing and broadcast happen under one lock: the
        // pending count only reflects this transaction after broadcast.
        let _guard = self.nonce_lock.lock().await;
        let nonce = self.chain.pending_nonce(self.builder.admin_address()).await?;
        let signed = self.builder.seal(&plan, nonce).await?;
        let hash = self.chain.broadcast(signed.raw.clone()).await?;

        if hash != signed.expected_hash {
            tracing::warn!(
                broadcast_hash = %hash,
                expected_hash = %signed.expected_hash,
                "Node-assigned hash differs from predicted hash"
            );
        }

        tracing::info!(
            user = %request.user_address,
            task_id = %request.task_id,
            verified = request.verified,
            nonce,
            tx_hash = %hash,
            "Attestation broadcast"
        );

        Ok(AttestationResult {
            transaction_hash: hash,
            accepted: true,
        })
    }

    /// Whether the submitter refused new work after a signing failure.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Stop accepting submissions (operator control).
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    /// Resume after operator intervention (e.g. key material replaced).
    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for AttestationSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationSubmitter")
            .field("admin_address", &self.builder.admin_address())
            .field("halted", &self.is_halted())
            .field("submit_timeout", &self.submit_timeout)
            .finish_non_exhaustive()
    }
}
