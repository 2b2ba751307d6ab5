//! Attestation service entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │              ATTESTATION SERVICE             │
//!                         │                                              │
//!   Participant proof     │  ┌────────┐     ┌──────────────┐             │
//!   ────────────────────> │  │  http  │───> │ proof store  │             │
//!                         │  │ server │     └──────────────┘             │
//!                         │  └───┬────┘                                  │
//!   Admin decision        │      │auth gate                              │
//!   ────────────────────> │      ▼                                       │
//!                         │  ┌──────────────┐    ┌────────────────────┐  │
//!                         │  │  attestation │───>│    chain client    │──┼──> RPC node
//!                         │  │   submitter  │    │ (gas, nonce, send) │  │
//!                         │  └──────┬───────┘    └────────────────────┘  │
//!                         │         │                                    │
//!                         │  ┌──────▼───────┐                            │
//!                         │  │ admin signer │  (custodial key, env only) │
//!                         │  └──────────────┘                            │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use attestor::attestation::{AttestationBuilder, AttestationSubmitter};
use attestor::chain::{spawn_health_probe, AdminSigner, ChainClient, ChainRpc};
use attestor::config::load_config;
use attestor::http::HttpServer;
use attestor::lifecycle::Shutdown;
use attestor::observability::{logging, metrics};
use attestor::proofs::{MemoryProofStore, ProofStore};

#[derive(Parser)]
#[command(name = "attestor")]
#[command(about = "Admin-gated on-chain attestation service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "attestor.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        contract = %config.contract.address,
        "attestor starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Validation already vetted the address; parse errors here mean the
    // file changed between validation and use.
    let contract = config
        .contract
        .address
        .parse()
        .map_err(|e| format!("invalid contract address: {e}"))?;

    let chain = Arc::new(ChainClient::connect(config.chain.clone()).await?);
    let signer = AdminSigner::from_env(config.chain.chain_id)?;

    let builder = AttestationBuilder::new(
        chain.clone() as Arc<dyn ChainRpc>,
        Arc::new(signer),
        contract,
        &config.chain,
    );
    let submitter = Arc::new(AttestationSubmitter::new(
        builder,
        chain.clone() as Arc<dyn ChainRpc>,
        config.admin.api_key.clone(),
        config.attestation.submit_timeout_secs,
        config.retries.clone(),
    ));
    let proofs: Arc<dyn ProofStore> = Arc::new(MemoryProofStore::new());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    spawn_health_probe(
        chain.clone(),
        std::time::Duration::from_secs(config.observability.health_probe_interval_secs),
        shutdown.subscribe(),
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(&config, submitter, proofs);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
