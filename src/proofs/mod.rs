//! Proof intake records.
//!
//! Screenshot bytes are stored by an external file-storage collaborator
//! (`store(file) -> handle`); this module keeps the metadata trail an
//! admin reviews before deciding, behind a storage interface the
//! pipeline does not need to know the backing technology of.

pub mod store;
pub mod types;

pub use store::{MemoryProofStore, ProofStore, StoreError};
pub use types::{ProofRecord, ProofStatus};
