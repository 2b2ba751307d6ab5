//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file + environment overrides
//!     → loader.rs (read, parse, env override)
//!     → validation.rs (semantic checks, all errors at once)
//!     → immutable AttestorConfig handed to component constructors
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, ADMIN_SECRET_ENV_VAR};
pub use schema::AttestorConfig;
pub use validation::{validate_config, ValidationError};
