//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with public and admin route groups
//! - Wire up middleware (tracing, request timeout, request IDs)
//! - Bind to the listener and serve until shutdown

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use alloy::primitives::Address;

use crate::attestation::AttestationSubmitter;
use crate::config::AttestorConfig;
use crate::proofs::{ProofRecord, ProofStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub submitter: Arc<AttestationSubmitter>,
    pub proofs: Arc<dyn ProofStore>,
    pub admin_secret: String,
}

/// HTTP server for the attestation service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server from configuration and pre-built components.
    ///
    /// Components are injected rather than constructed here so tests
    /// can run the full HTTP surface against a stub chain.
    pub fn new(
        config: &AttestorConfig,
        submitter: Arc<AttestationSubmitter>,
        proofs: Arc<dyn ProofStore>,
    ) -> Self {
        let state = AppState {
            submitter,
            proofs,
            admin_secret: config.admin.api_key.clone(),
        };

        let router = Self::build_router(config, state);
        Self { router }
    }

    fn build_router(config: &AttestorConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/proofs", post(register_proof))
            .with_state(state.clone())
            .merge(crate::admin::admin_router(state))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "submitter_halted": state.submitter.is_halted(),
    }))
}

#[derive(Debug, Deserialize)]
struct RegisterProofBody {
    user_address: Address,
    task_id: String,
    /// Handle previously returned by the file-storage collaborator.
    proof_handle: String,
}

/// Participant-facing proof registration.
async fn register_proof(
    State(state): State<AppState>,
    Json(body): Json<RegisterProofBody>,
) -> Response {
    let record = ProofRecord::new(body.user_address, body.task_id, body.proof_handle);

    match state.proofs.record_pending(record).await {
        Ok(id) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "proof_id": id,
                "message": "proof registered and awaiting admin verification",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to record proof");
            (StatusCode::INTERNAL_SERVER_ERROR, "proof store unavailable").into_response()
        }
    }
}
