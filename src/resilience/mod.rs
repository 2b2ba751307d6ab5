//! Resilience utilities.
//!
//! Every external call has a deadline; transient chain failures are
//! retried with exponential backoff and a fully rebuilt transaction.

pub mod backoff;

pub use backoff::backoff_delay;
