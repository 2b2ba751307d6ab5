//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multiplier >= 1.0)
//! - Reject placeholder secrets and malformed addresses
//!
//! Returns all validation errors, not just the first, so an operator
//! can fix a config file in one pass.

use alloy::primitives::Address;

use crate::config::schema::AttestorConfig;

/// A single configuration defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Validate a configuration. Pure function; collects every defect.
pub fn validate_config(config: &AttestorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a socket address: '{}'", config.listener.bind_address),
        ));
    }

    if config.chain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(err(
            "chain.rpc_url",
            format!("not a valid URL: '{}'", config.chain.rpc_url),
        ));
    }
    for url in &config.chain.failover_urls {
        if url.parse::<url::Url>().is_err() {
            errors.push(err(
                "chain.failover_urls",
                format!("not a valid URL: '{}'", url),
            ));
        }
    }
    if config.chain.chain_id == 0 {
        errors.push(err("chain.chain_id", "must be non-zero"));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(err("chain.rpc_timeout_secs", "must be greater than zero"));
    }
    if config.chain.gas_price_multiplier < 1.0 {
        errors.push(err(
            "chain.gas_price_multiplier",
            "must be at least 1.0; a discount guarantees underpriced transactions",
        ));
    }
    if config.chain.max_gas_price_gwei == 0 {
        errors.push(err("chain.max_gas_price_gwei", "must be greater than zero"));
    }

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(err(
            "contract.address",
            format!("not a valid address: '{}'", config.contract.address),
        ));
    }

    if config.admin.api_key.is_empty() || config.admin.api_key == "CHANGE_ME_IN_PRODUCTION" {
        errors.push(err(
            "admin.api_key",
            "must be set to a real secret (or provide ATTESTOR_ADMIN_SECRET)",
        ));
    }

    if config.attestation.submit_timeout_secs == 0 {
        errors.push(err(
            "attestation.submit_timeout_secs",
            "must be greater than zero",
        ));
    }

    if config.retries.enabled && config.retries.max_attempts == 0 {
        errors.push(err("retries.max_attempts", "must be at least 1 when enabled"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be greater than zero"));
    }

    if config.observability.health_probe_interval_secs == 0 {
        errors.push(err(
            "observability.health_probe_interval_secs",
            "must be greater than zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
