//! Admin API handlers.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Instant;

use crate::admin::auth::bearer_token;
use crate::attestation::types::{AttestationError, VerificationRequest};
use crate::chain::ChainError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proofs::types::ProofStatus;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub submitter_halted: bool,
}

#[derive(Serialize)]
pub struct VerifyTaskResponse {
    pub success: bool,
    pub transaction_hash: String,
    pub accepted: bool,
    pub message: &'static str,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        submitter_halted: state.submitter.is_halted(),
    })
}

/// Attest a verification decision on-chain.
///
/// The route group middleware already rejected unauthenticated callers,
/// but the token still travels into the submitter: the pipeline's own
/// gate is the invariant, the middleware is just transport courtesy.
pub async fn verify_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VerificationRequest>,
) -> Response {
    let start = Instant::now();
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .unwrap_or_default();

    match state.submitter.submit_with_retry(&request, token).await {
        Ok(result) => {
            metrics::record_attestation("success", start);

            // Best effort: a decision may arrive for a task nobody
            // registered a proof for.
            let status = if request.verified {
                ProofStatus::Attested {
                    tx_hash: result.transaction_hash.to_string(),
                }
            } else {
                ProofStatus::Rejected
            };
            if let Err(e) = state
                .proofs
                .record_result(request.user_address, &request.task_id, status)
                .await
            {
                tracing::debug!(error = %e, "No proof record to update for attested task");
            }

            Json(VerifyTaskResponse {
                success: true,
                transaction_hash: result.transaction_hash.to_string(),
                accepted: result.accepted,
                message: if request.verified {
                    "task verified on-chain"
                } else {
                    "task verification rejected on-chain"
                },
            })
            .into_response()
        }
        Err(e) => {
            metrics::record_attestation(e.metric_label(), start);
            attestation_error_response(e)
        }
    }
}

pub async fn get_pending_proofs(State(state): State<AppState>) -> Response {
    match state.proofs.find_pending().await {
        Ok(proofs) => Json(proofs).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list pending proofs");
            (StatusCode::INTERNAL_SERVER_ERROR, "proof store unavailable").into_response()
        }
    }
}

/// Map the pipeline error taxonomy onto HTTP statuses without losing
/// the distinction between logical rejection and transport failure.
fn attestation_error_response(err: AttestationError) -> Response {
    let status = match &err {
        AttestationError::Unauthorized => StatusCode::UNAUTHORIZED,
        AttestationError::EstimationFailed(_) => StatusCode::CONFLICT,
        AttestationError::Chain(ChainError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AttestationError::Chain(_) => StatusCode::BAD_GATEWAY,
        AttestationError::SigningFailed(_) | AttestationError::GasPriceTooHigh { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "kind": err.metric_label(),
            "retryable": err.is_retryable(),
        })),
    )
        .into_response()
}
