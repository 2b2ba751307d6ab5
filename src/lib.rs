//! Admin-gated on-chain attestation service for airdrop campaigns.
//!
//! Participants register proofs of social-media task completion; an
//! administrator reviews them and attests the decision on-chain by
//! calling the campaign contract's `verifyTask` entry point with a
//! custodial key.

pub mod admin;
pub mod attestation;
pub mod chain;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proofs;
pub mod resilience;

pub use attestation::{AttestationError, AttestationResult, AttestationSubmitter};
pub use chain::{ChainClient, ChainRpc};
pub use config::AttestorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
