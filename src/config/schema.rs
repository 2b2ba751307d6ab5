//! Configuration schema definitions.
//!
//! The whole configuration is loaded once at startup and never mutated
//! afterwards; components receive the pieces they need by value.

use serde::{Deserialize, Serialize};

/// Root configuration for the attestation service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AttestorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Chain RPC settings.
    pub chain: ChainConfig,

    /// Campaign contract settings.
    pub contract: ContractConfig,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Attestation pipeline settings.
    pub attestation: AttestationConfig,

    /// Retry configuration for transient chain failures.
    pub retries: RetryConfig,

    /// HTTP timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 56 for BSC, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas price multiplier (1.0 = as quoted, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Campaign contract configuration.
///
/// The contract's interface schema is compiled in (`verifyTask` only);
/// the address is deployment-specific.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractConfig {
    /// Address of the campaign contract.
    pub address: String,
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for the authorization gate (Bearer token).
    /// Overridden by `ATTESTOR_ADMIN_SECRET` when set.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            // WARNING: placeholder, rejected by validation.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Attestation pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AttestationConfig {
    /// Deadline for one whole submit call in seconds.
    pub submit_timeout_secs: u64,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            submit_timeout_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries for transient chain failures.
    pub enabled: bool,

    /// Maximum number of attempts per request.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// HTTP timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Interval between RPC health probes in seconds.
    pub health_probe_interval_secs: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
            health_probe_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AttestorConfig::default();
        assert_eq!(config.chain.rpc_timeout_secs, 10);
        assert_eq!(config.chain.gas_price_multiplier, 1.2);
        assert_eq!(config.attestation.submit_timeout_secs, 30);
        assert_eq!(config.observability.health_probe_interval_secs, 30);
        assert!(config.retries.enabled);
    }

    #[test]
    fn test_toml_parse() {
        let config: AttestorConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:3000"

            [chain]
            rpc_url = "https://bsc-dataseed.binance.org/"
            chain_id = 56

            [contract]
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

            [admin]
            api_key = "test-secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.chain_id, 56);
        assert_eq!(config.admin.api_key, "test-secret");
        // Unspecified sections fall back to defaults.
        assert_eq!(config.retries.max_attempts, 3);
    }
}
