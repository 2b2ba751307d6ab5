//! Admin-gated on-chain attestation pipeline.
//!
//! # Data Flow
//! ```text
//! Admin decision {user_address, task_id, verified} + bearer token
//!     → admin::auth (constant-time gate)
//!     → builder.rs (ABI encoding, gas quote, signing)
//!     → chain client (nonce, broadcast)
//!     → AttestationResult { transaction_hash, accepted } or typed error
//! ```
//!
//! # Invariants
//! - No request reaches the builder without passing the gate
//! - Gas quotes and nonces are fetched fresh per submission
//! - Nonce allocation is serialized per admin key

pub mod builder;
pub mod submitter;
pub mod types;

pub use builder::{AttestationBuilder, TxPlan};
pub use submitter::AttestationSubmitter;
pub use types::{
    AttestationError, AttestationOutcome, AttestationResult, GasQuote, VerificationRequest,
};
