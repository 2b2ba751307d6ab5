//! Shared utilities for integration testing.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{b256, Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use attestor::attestation::{AttestationBuilder, AttestationSubmitter};
use attestor::chain::{
    AdminSigner, ChainError, ChainResult, ChainRpc, SignedTransaction, SignerError,
    TransactionSigner,
};
use attestor::config::schema::{ChainConfig, RetryConfig};

/// Anvil's first well-known dev account.
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_SECRET: &str = "test-admin-secret";
pub const TEST_CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const TEST_CHAIN_ID: u64 = 31337;

/// Hash the stub node assigns to every accepted broadcast.
pub const BROADCAST_HASH: TxHash =
    b256!("deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef");

#[derive(Default)]
pub struct CallCounts {
    pub gas_price: AtomicU32,
    pub estimate_gas: AtomicU32,
    pub pending_nonce: AtomicU32,
    pub broadcast: AtomicU32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.gas_price.load(Ordering::SeqCst)
            + self.estimate_gas.load(Ordering::SeqCst)
            + self.pending_nonce.load(Ordering::SeqCst)
            + self.broadcast.load(Ordering::SeqCst)
    }
}

/// Programmable chain double with call counters.
///
/// Pending-count semantics are modeled faithfully: the nonce starts at
/// `base_nonce` and grows with every accepted broadcast.
pub struct StubChain {
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub base_nonce: u64,
    pub calls: CallCounts,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
    /// Make gas estimation report a contract revert.
    pub revert_on_estimate: bool,
    /// Fail this many broadcasts with a connection error first.
    pub broadcast_connection_failures: AtomicU32,
    /// Stall gas price queries (for deadline tests).
    pub gas_price_delay: Option<Duration>,
    /// Widen the race window between nonce read and broadcast.
    pub nonce_delay: Option<Duration>,
}

impl StubChain {
    pub fn new(gas_price: u128, gas_estimate: u64, base_nonce: u64) -> Self {
        Self {
            gas_price,
            gas_estimate,
            base_nonce,
            calls: CallCounts::default(),
            broadcasts: Mutex::new(Vec::new()),
            revert_on_estimate: false,
            broadcast_connection_failures: AtomicU32::new(0),
            gas_price_delay: None,
            nonce_delay: None,
        }
    }

    /// Decode every broadcast payload back into a transaction envelope.
    pub fn broadcast_envelopes(&self) -> Vec<TxEnvelope> {
        self.broadcasts
            .lock()
            .unwrap()
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap())
            .collect()
    }
}

#[async_trait]
impl ChainRpc for StubChain {
    async fn gas_price(&self) -> ChainResult<u128> {
        self.calls.gas_price.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.gas_price_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> ChainResult<u64> {
        self.calls.estimate_gas.fetch_add(1, Ordering::SeqCst);
        if self.revert_on_estimate {
            return Err(ChainError::EstimationFailed("execution reverted".into()));
        }
        Ok(self.gas_estimate)
    }

    async fn pending_nonce(&self, _address: Address) -> ChainResult<u64> {
        self.calls.pending_nonce.fetch_add(1, Ordering::SeqCst);
        let nonce = self.base_nonce + self.broadcasts.lock().unwrap().len() as u64;
        if let Some(delay) = self.nonce_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(nonce)
    }

    async fn broadcast(&self, raw: Vec<u8>) -> ChainResult<TxHash> {
        self.calls.broadcast.fetch_add(1, Ordering::SeqCst);
        let failures_left = self.broadcast_connection_failures.load(Ordering::SeqCst);
        if failures_left > 0 {
            self.broadcast_connection_failures
                .store(failures_left - 1, Ordering::SeqCst);
            return Err(ChainError::Connection("connection reset by peer".into()));
        }
        self.broadcasts.lock().unwrap().push(raw);
        Ok(BROADCAST_HASH)
    }

    fn chain_id(&self) -> u64 {
        TEST_CHAIN_ID
    }
}

/// Signer double whose signing always fails, as corrupt key material
/// would.
pub struct BrokenSigner;

#[async_trait]
impl TransactionSigner for BrokenSigner {
    fn address(&self) -> Address {
        Address::ZERO
    }

    fn chain_id(&self) -> u64 {
        TEST_CHAIN_ID
    }

    async fn sign_transaction(
        &self,
        _tx: TransactionRequest,
    ) -> Result<SignedTransaction, SignerError> {
        Err(SignerError("key material rejected by signer".to_string()))
    }
}

pub fn test_chain_config() -> ChainConfig {
    ChainConfig {
        chain_id: TEST_CHAIN_ID,
        gas_price_multiplier: 1.0,
        max_gas_price_gwei: 10_000,
        ..ChainConfig::default()
    }
}

pub fn test_retries() -> RetryConfig {
    RetryConfig {
        enabled: true,
        max_attempts: 3,
        base_delay_ms: 10,
        max_delay_ms: 50,
    }
}

/// Build a submitter wired to the given stub.
pub fn test_submitter(chain: Arc<StubChain>) -> AttestationSubmitter {
    submitter_with(chain, 5, test_retries())
}

pub fn submitter_with(
    chain: Arc<StubChain>,
    submit_timeout_secs: u64,
    retries: RetryConfig,
) -> AttestationSubmitter {
    let signer = AdminSigner::from_private_key(TEST_PRIVATE_KEY, TEST_CHAIN_ID).unwrap();
    submitter_with_signer(chain, Arc::new(signer), submit_timeout_secs, retries)
}

/// Build a submitter around an arbitrary signer implementation.
pub fn submitter_with_signer(
    chain: Arc<StubChain>,
    signer: Arc<dyn TransactionSigner>,
    submit_timeout_secs: u64,
    retries: RetryConfig,
) -> AttestationSubmitter {
    let contract: Address = TEST_CONTRACT.parse().unwrap();
    let builder = AttestationBuilder::new(
        chain.clone() as Arc<dyn ChainRpc>,
        signer,
        contract,
        &test_chain_config(),
    );
    AttestationSubmitter::new(
        builder,
        chain as Arc<dyn ChainRpc>,
        TEST_SECRET.to_string(),
        submit_timeout_secs,
        retries,
    )
}
