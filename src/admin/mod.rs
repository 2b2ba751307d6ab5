pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

/// Admin route group, all behind the authorization gate.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/status", get(get_status))
        .route("/api/admin/verify-task", post(verify_task))
        .route("/api/admin/pending-proofs", get(get_pending_proofs))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ))
        .with_state(state)
}

pub use auth::authorize;
