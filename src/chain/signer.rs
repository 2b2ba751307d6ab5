//! Custodial admin key handling and transaction signing.
//!
//! # Security
//! - The private key is loaded ONLY from an environment variable
//! - Key material is never logged or serialized
//! - The rest of the pipeline sees a narrow signing capability, so the
//!   key's storage can change without touching pipeline logic

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use thiserror::Error;

/// Environment variable name for the admin private key.
pub const ADMIN_KEY_ENV_VAR: &str = "ATTESTOR_ADMIN_PRIVATE_KEY";

/// Signing failed: malformed key material or an unsignable request.
///
/// This is a fatal configuration defect, never retried.
#[derive(Debug, Error)]
#[error("signing failed: {0}")]
pub struct SignerError(pub String);

/// A signed, broadcast-ready transaction.
///
/// Produced only by [`AdminSigner`], consumed only by broadcast, never
/// persisted: the raw bytes embed a signature over key-derived data.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// EIP-2718 encoded payload for `eth_sendRawTransaction`.
    pub raw: Vec<u8>,
    /// Hash the chain will assign once the payload is accepted.
    /// Signing is deterministic, so this is reliable before broadcast.
    pub expected_hash: TxHash,
}

/// Narrow signing capability the attestation pipeline depends on.
///
/// Production uses [`AdminSigner`]; tests substitute failing signers to
/// exercise the halt-on-signing-failure path without bad key material.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account address transactions are signed for.
    fn address(&self) -> Address;

    /// Chain ID this signer produces transactions for.
    fn chain_id(&self) -> u64;

    /// Sign a fully assembled transaction request.
    async fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<SignedTransaction, SignerError>;
}

/// Holder of the custodial admin key.
pub struct AdminSigner {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    chain_id: u64,
}

impl AdminSigner {
    /// Create a signer from a hex-encoded private key string.
    ///
    /// The key is parsed and held in memory only; it is never logged.
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> Result<Self, SignerError> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| SignerError(format!("invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Admin signer initialized"
        );

        let wallet = EthereumWallet::from(signer.clone());
        Ok(Self {
            signer,
            wallet,
            chain_id,
        })
    }

    /// Load the admin key from `ATTESTOR_ADMIN_PRIVATE_KEY`.
    pub fn from_env(chain_id: u64) -> Result<Self, SignerError> {
        let private_key = std::env::var(ADMIN_KEY_ENV_VAR).map_err(|_| {
            SignerError(format!("environment variable {} not set", ADMIN_KEY_ENV_VAR))
        })?;

        Self::from_private_key(&private_key, chain_id)
    }

    /// The admin account address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain ID this signer produces transactions for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a fully assembled transaction request.
    ///
    /// The request must already carry nonce, gas limit, gas price and
    /// chain ID; signing does not fill in missing fields.
    pub async fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<SignedTransaction, SignerError> {
        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| SignerError(format!("transaction encoding error: {}", e)))?;

        Ok(SignedTransaction {
            raw: envelope.encoded_2718(),
            expected_hash: *envelope.tx_hash(),
        })
    }
}

#[async_trait]
impl TransactionSigner for AdminSigner {
    fn address(&self) -> Address {
        AdminSigner::address(self)
    }

    fn chain_id(&self) -> u64 {
        AdminSigner::chain_id(self)
    }

    async fn sign_transaction(
        &self,
        tx: TransactionRequest,
    ) -> Result<SignedTransaction, SignerError> {
        AdminSigner::sign_transaction(self, tx).await
    }
}

impl Clone for AdminSigner {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            wallet: self.wallet.clone(),
            chain_id: self.chain_id,
        }
    }
}

impl std::fmt::Debug for AdminSigner {
    // Key material must never leak through Debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSigner")
            .field("address", &self.signer.address())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::network::TransactionBuilder;
    use alloy::primitives::{Bytes, U256};

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signer_from_private_key() {
        let signer = AdminSigner::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        assert_eq!(
            signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_signer_with_0x_prefix() {
        let signer =
            AdminSigner::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY), 1).unwrap();
        assert_eq!(
            signer.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_invalid_private_key() {
        let result = AdminSigner::from_private_key("invalid_key", 1);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("invalid private key"));
    }

    #[tokio::test]
    async fn test_sign_transaction_roundtrip() {
        let signer = AdminSigner::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let to: Address = "0x000000000000000000000000000000000000dEaD"
            .parse()
            .unwrap();

        let tx = TransactionRequest::default()
            .with_from(signer.address())
            .with_to(to)
            .with_value(U256::ZERO)
            .with_input(Bytes::from(vec![0xab, 0xcd]))
            .with_nonce(7)
            .with_gas_limit(21_000)
            .with_gas_price(5)
            .with_chain_id(31337);

        let signed = signer.sign_transaction(tx).await.unwrap();

        let envelope = TxEnvelope::decode_2718(&mut signed.raw.as_slice()).unwrap();
        assert_eq!(envelope.nonce(), 7);
        assert_eq!(envelope.gas_limit(), 21_000);
        assert_eq!(envelope.chain_id(), Some(31337));
        assert_eq!(*envelope.tx_hash(), signed.expected_hash);
    }
}
