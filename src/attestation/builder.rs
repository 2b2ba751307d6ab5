//! Contract call encoding and transaction assembly.
//!
//! # Responsibilities
//! - ABI-encode `verifyTask(address,string,bool)` into call data
//! - Obtain a fresh gas quote (estimate + priced gas) per submission
//! - Assemble and sign the final transaction once a nonce is allocated
//!
//! Nonce allocation deliberately lives outside this module: the
//! submitter serializes it, so `prepare` can run concurrently across
//! requests while `seal` happens under the nonce lock.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;
use alloy::sol;
use alloy::sol_types::SolCall;
use std::sync::Arc;

use crate::attestation::types::{AttestationError, GasQuote};
use crate::chain::{ChainRpc, SignedTransaction, TransactionSigner};
use crate::config::schema::ChainConfig;

sol! {
    /// Task-verification entry point of the campaign contract.
    function verifyTask(address user, string taskId, bool verified);
}

/// A priced, encoded call waiting for a nonce.
#[derive(Debug, Clone)]
pub struct TxPlan {
    call_data: Bytes,
    quote: GasQuote,
}

impl TxPlan {
    /// The gas quote fetched for this plan.
    pub fn quote(&self) -> GasQuote {
        self.quote
    }
}

/// Builds signed `verifyTask` transactions for the admin account.
pub struct AttestationBuilder {
    chain: Arc<dyn ChainRpc>,
    signer: Arc<dyn TransactionSigner>,
    contract: Address,
    gas_price_multiplier: f64,
    max_gas_price_gwei: u64,
}

impl AttestationBuilder {
    /// Create a builder for the given contract.
    pub fn new(
        chain: Arc<dyn ChainRpc>,
        signer: Arc<dyn TransactionSigner>,
        contract: Address,
        config: &ChainConfig,
    ) -> Self {
        Self {
            chain,
            signer,
            contract,
            gas_price_multiplier: config.gas_price_multiplier,
            max_gas_price_gwei: config.max_gas_price_gwei,
        }
    }

    /// The admin account transactions are sent from.
    pub fn admin_address(&self) -> Address {
        self.signer.address()
    }

    /// Encode the contract call and fetch a fresh gas quote for it.
    ///
    /// The estimate simulates this exact call data from the admin
    /// account, so a contract-side rejection (task already verified,
    /// caller not authorized on-chain) surfaces here as
    /// [`AttestationError::EstimationFailed`] before anything is signed.
    pub async fn prepare(
        &self,
        user: Address,
        task_id: &str,
        verified: bool,
    ) -> Result<TxPlan, AttestationError> {
        let call = verifyTaskCall {
            user,
            taskId: task_id.to_string(),
            verified,
        };
        let call_data: Bytes = call.abi_encode().into();

        let probe = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(self.contract)
            .with_input(call_data.clone());
        let gas_limit = self.chain.estimate_gas(probe).await?;

        let gas_price = self.chain.gas_price().await?;
        let gas_price_gwei = gas_price / 1_000_000_000;
        if gas_price_gwei > self.max_gas_price_gwei as u128 {
            return Err(AttestationError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.max_gas_price_gwei,
            });
        }

        // Safety margin against repricing between quote and broadcast.
        let adjusted_gas_price = (gas_price as f64 * self.gas_price_multiplier) as u128;

        Ok(TxPlan {
            call_data,
            quote: GasQuote {
                gas_limit,
                gas_price: adjusted_gas_price,
            },
        })
    }

    /// Assemble the final transaction with the allocated nonce and sign
    /// it with the custodial key.
    pub async fn seal(
        &self,
        plan: &TxPlan,
        nonce: u64,
    ) -> Result<SignedTransaction, AttestationError> {
        let tx = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_to(self.contract)
            .with_input(plan.call_data.clone())
            .with_nonce(nonce)
            .with_gas_limit(plan.quote.gas_limit)
            .with_gas_price(plan.quote.gas_price)
            .with_chain_id(self.signer.chain_id());

        Ok(self.signer.sign_transaction(tx).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{AdminSigner, ChainError, ChainResult};
    use alloy::primitives::{keccak256, TxHash};
    use async_trait::async_trait;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct FixedChain {
        gas_price: u128,
        gas_estimate: u64,
    }

    #[async_trait]
    impl ChainRpc for FixedChain {
        async fn gas_price(&self) -> ChainResult<u128> {
            Ok(self.gas_price)
        }

        async fn estimate_gas(&self, _tx: TransactionRequest) -> ChainResult<u64> {
            Ok(self.gas_estimate)
        }

        async fn pending_nonce(&self, _address: Address) -> ChainResult<u64> {
            Ok(0)
        }

        async fn broadcast(&self, _raw: Vec<u8>) -> ChainResult<TxHash> {
            Err(ChainError::Connection("not wired in this test".into()))
        }

        fn chain_id(&self) -> u64 {
            31337
        }
    }

    fn test_builder(chain: FixedChain, multiplier: f64, max_gwei: u64) -> AttestationBuilder {
        let signer = AdminSigner::from_private_key(TEST_PRIVATE_KEY, 31337).unwrap();
        let signer: Arc<dyn TransactionSigner> = Arc::new(signer);
        let config = ChainConfig {
            gas_price_multiplier: multiplier,
            max_gas_price_gwei: max_gwei,
            ..ChainConfig::default()
        };
        let contract: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            .parse()
            .unwrap();
        AttestationBuilder::new(Arc::new(chain), signer, contract, &config)
    }

    #[test]
    fn test_call_data_selector() {
        let selector = &keccak256(b"verifyTask(address,string,bool)")[..4];
        assert_eq!(&verifyTaskCall::SELECTOR[..], selector);
    }

    #[tokio::test]
    async fn test_prepare_quotes_fresh_gas() {
        let builder = test_builder(
            FixedChain {
                gas_price: 5,
                gas_estimate: 21_000,
            },
            1.0,
            100,
        );
        let user: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            .parse()
            .unwrap();

        let plan = builder.prepare(user, "twitter_follow_1", true).await.unwrap();
        assert_eq!(
            plan.quote(),
            GasQuote {
                gas_limit: 21_000,
                gas_price: 5
            }
        );
    }

    #[tokio::test]
    async fn test_prepare_applies_multiplier() {
        let builder = test_builder(
            FixedChain {
                gas_price: 1_000_000_000, // 1 gwei
                gas_estimate: 50_000,
            },
            1.2,
            100,
        );
        let user: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            .parse()
            .unwrap();

        let plan = builder.prepare(user, "t", false).await.unwrap();
        assert_eq!(plan.quote().gas_price, 1_200_000_000);
    }

    #[tokio::test]
    async fn test_prepare_rejects_gas_spike() {
        let builder = test_builder(
            FixedChain {
                gas_price: 600_000_000_000, // 600 gwei
                gas_estimate: 50_000,
            },
            1.0,
            500,
        );
        let user: Address = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
            .parse()
            .unwrap();

        let err = builder.prepare(user, "t", true).await.unwrap_err();
        assert!(matches!(
            err,
            AttestationError::GasPriceTooHigh {
                current_gwei: 600,
                max_gwei: 500
            }
        ));
    }
}
