//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AttestorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the configured admin secret.
pub const ADMIN_SECRET_ENV_VAR: &str = "ATTESTOR_ADMIN_SECRET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// `ATTESTOR_ADMIN_SECRET`, when set, takes precedence over the
/// `admin.api_key` value from the file.
pub fn load_config(path: &Path) -> Result<AttestorConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: AttestorConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    if let Ok(secret) = std::env::var(ADMIN_SECRET_ENV_VAR) {
        config.admin.api_key = secret;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
