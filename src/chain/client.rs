//! Blockchain RPC client with timeout and error classification.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint (primary + failovers)
//! - Fetch gas prices and pending nonces (always fresh, never cached)
//! - Simulate contract calls for gas estimation
//! - Broadcast signed transactions
//!
//! Failover only applies to transport failures. A JSON-RPC error
//! response is a deterministic answer from the chain and is returned
//! immediately instead of being retried against another node.

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::types::{ChainConfig, ChainError, ChainId, ChainResult};
use crate::observability::metrics;

type TransportError = RpcError<TransportErrorKind>;

/// Narrow view of the RPC surface the attestation pipeline needs.
///
/// Production uses [`ChainClient`]; tests substitute a stub with call
/// counters to assert that authorization failures never reach the chain.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Current network-suggested gas price in wei. Fetched fresh on
    /// every call; prices are time-sensitive and must not be cached.
    async fn gas_price(&self) -> ChainResult<u128>;

    /// Simulate `tx` against current chain state and return the gas it
    /// would consume. Fails with [`ChainError::EstimationFailed`] when
    /// the contract would revert the call.
    async fn estimate_gas(&self, tx: TransactionRequest) -> ChainResult<u64>;

    /// Transaction count for `address` including the pending pool, so
    /// in-flight transactions from the same account are reflected.
    async fn pending_nonce(&self, address: Address) -> ChainResult<u64>;

    /// Submit a raw signed payload. Returns the transaction hash as
    /// soon as the node accepts it into the pending pool; confirmation
    /// is out of scope.
    async fn broadcast(&self, raw: Vec<u8>) -> ChainResult<TxHash>;

    /// Chain ID transactions are signed for.
    fn chain_id(&self) -> u64;
}

/// RPC client wrapper with failover support.
#[derive(Clone)]
pub struct ChainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: ChainConfig,
    /// Per-request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Connect to the configured RPC endpoints.
    ///
    /// Initialization succeeds even when the chain is unreachable; the
    /// first submission will surface the connection error instead.
    pub async fn connect(config: ChainConfig) -> ChainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::Connection(format!("invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(
            Arc::new(ProviderBuilder::new().connect_http(primary_url))
                as Arc<dyn Provider + Send + Sync>,
        );

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(
                    Arc::new(ProviderBuilder::new().connect_http(url))
                        as Arc<dyn Provider + Send + Sync>,
                );
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            config: config.clone(),
            timeout_duration,
        };

        match client.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    chain_id = config.chain_id,
                    "Chain client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Chain client initialized but chain verification failed"
                );
            }
        }

        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> ChainResult<()> {
        let remote = self.remote_chain_id().await?;
        if remote.0 != self.config.chain_id {
            return Err(ChainError::Connection(format!(
                "chain ID mismatch: expected {}, got {}",
                self.config.chain_id, remote.0
            )));
        }
        Ok(())
    }

    /// Query the chain ID reported by the RPC endpoint.
    pub async fn remote_chain_id(&self) -> ChainResult<ChainId> {
        let mut last = no_providers();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_chain_id()).await {
                Ok(Ok(id)) => return Ok(ChainId(id)),
                Ok(Err(e)) => last = self.note_failure("chain_id", i, e),
                Err(_) => last = self.note_timeout("chain_id", i),
            }
        }
        Err(last)
    }

    /// Whether the RPC endpoint currently answers queries.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.remote_chain_id().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn note_failure(&self, op: &'static str, idx: usize, err: TransportError) -> ChainError {
        metrics::record_rpc_failover(op);
        tracing::warn!(op, provider_idx = idx, error = %err, "RPC error, trying next provider");
        ChainError::Connection(err.to_string())
    }

    fn note_timeout(&self, op: &'static str, idx: usize) -> ChainError {
        metrics::record_rpc_failover(op);
        tracing::warn!(op, provider_idx = idx, "RPC timeout, trying next provider");
        ChainError::Timeout(self.config.rpc_timeout_secs)
    }
}

fn no_providers() -> ChainError {
    ChainError::Connection("no RPC providers configured".to_string())
}

/// Spawn a background task probing RPC health on a fixed interval.
///
/// Each probe records the `attestor_rpc_healthy` gauge; the task exits
/// when the shutdown signal fires.
pub fn spawn_health_probe(
    client: Arc<ChainClient>,
    interval: Duration,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !client.is_healthy().await {
                        tracing::warn!(rpc_url = %client.config.rpc_url, "RPC health probe failed");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    })
}

#[async_trait]
impl ChainRpc for ChainClient {
    async fn gas_price(&self) -> ChainResult<u128> {
        let mut last = no_providers();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.get_gas_price()).await {
                Ok(Ok(price)) => return Ok(price),
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        return Err(ChainError::Connection(payload.message.to_string()));
                    }
                    last = self.note_failure("gas_price", i, e);
                }
                Err(_) => last = self.note_timeout("gas_price", i),
            }
        }
        Err(last)
    }

    async fn estimate_gas(&self, tx: TransactionRequest) -> ChainResult<u64> {
        let mut last = no_providers();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.estimate_gas(tx.clone())).await {
                Ok(Ok(gas)) => return Ok(gas),
                Ok(Err(e)) => {
                    // The node answered: the call would revert on-chain.
                    if let Some(payload) = e.as_error_resp() {
                        return Err(ChainError::EstimationFailed(payload.message.to_string()));
                    }
                    last = self.note_failure("estimate_gas", i, e);
                }
                Err(_) => last = self.note_timeout("estimate_gas", i),
            }
        }
        Err(last)
    }

    async fn pending_nonce(&self, address: Address) -> ChainResult<u64> {
        let mut last = no_providers();
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address).pending();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(nonce)) => return Ok(nonce),
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        return Err(ChainError::Connection(payload.message.to_string()));
                    }
                    last = self.note_failure("pending_nonce", i, e);
                }
                Err(_) => last = self.note_timeout("pending_nonce", i),
            }
        }
        Err(last)
    }

    async fn broadcast(&self, raw: Vec<u8>) -> ChainResult<TxHash> {
        let mut last = no_providers();
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.send_raw_transaction(&raw)).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        return Err(ChainError::BroadcastRejected(payload.message.to_string()));
                    }
                    last = self.note_failure("broadcast", i, e);
                }
                Err(_) => last = self.note_timeout("broadcast", i),
            }
        }
        Err(last)
    }

    fn chain_id(&self) -> u64 {
        self.config.chain_id
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ChainConfig {
        ChainConfig {
            // A port nothing listens on, so tests never hit a real node.
            rpc_url: "http://127.0.0.1:59999".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337, // Anvil default
            rpc_timeout_secs: 1,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 100,
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        // Creation must succeed even when no node is listening.
        let result = ChainClient::connect(test_config()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_rpc_url_rejected() {
        let mut config = test_config();
        config.rpc_url = "not a url".to_string();
        let result = ChainClient::connect(config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_unhealthy() {
        let client = ChainClient::connect(test_config()).await.unwrap();
        assert!(!client.is_healthy().await);
    }

    #[tokio::test]
    async fn test_health_probe_stops_on_shutdown() {
        let client = Arc::new(ChainClient::connect(test_config()).await.unwrap());
        let (tx, rx) = tokio::sync::broadcast::channel(1);

        let handle = spawn_health_probe(client, Duration::from_millis(10), rx);
        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failover_exhaustion() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:1".to_string());

        let client = ChainClient::connect(config).await.unwrap();
        // Both endpoints are dead; the last transport error surfaces.
        let result = client.gas_price().await;
        assert!(result.is_err());
    }
}
