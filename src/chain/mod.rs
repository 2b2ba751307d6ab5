//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment variable (admin private key)
//!     → signer.rs (key loading, transaction signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → attestation layer (build, sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Private key ONLY from the environment
//! - Never log key material
//! - Every RPC call has a configurable deadline
//! - Only the signer touches the key; only the client holds the RPC
//!   connection

pub mod client;
pub mod signer;
pub mod types;

pub use client::{spawn_health_probe, ChainClient, ChainRpc};
pub use signer::{AdminSigner, SignedTransaction, SignerError, TransactionSigner};
pub use types::{ChainConfig, ChainError, ChainId, ChainResult};
