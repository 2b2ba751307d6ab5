//! HTTP transport layer.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router, timeout + request ID middleware)
//!     → admin route group (authorization gate middleware)
//!     → attestation pipeline / proof store
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
