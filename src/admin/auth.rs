//! Admin authorization gate.
//!
//! Token comparison is constant-time over the token contents
//! (`subtle::ConstantTimeEq`), so response timing reveals nothing about
//! how much of a guessed secret matched.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::attestation::types::AttestationError;
use crate::http::server::AppState;

/// Validate an out-of-band authorization token against the configured
/// admin secret.
///
/// On mismatch fails with [`AttestationError::Unauthorized`]; no side
/// effects, no chain interaction attempted.
pub fn authorize(provided: &[u8], expected: &[u8]) -> Result<(), AttestationError> {
    if bool::from(provided.ct_eq(expected)) {
        Ok(())
    } else {
        Err(AttestationError::Unauthorized)
    }
}

/// Extract the token from a `Bearer` authorization header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Axum middleware guarding the admin route group.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .unwrap_or_default();

    match authorize(token.as_bytes(), state.admin_secret.as_bytes()) {
        Ok(()) => Ok(next.run(request).await),
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_token() {
        assert!(authorize(b"s3cret", b"s3cret").is_ok());
    }

    #[test]
    fn test_mismatch_same_length() {
        assert!(matches!(
            authorize(b"s3cre7", b"s3cret"),
            Err(AttestationError::Unauthorized)
        ));
    }

    #[test]
    fn test_mismatch_different_length() {
        assert!(authorize(b"s3cret-but-longer", b"s3cret").is_err());
        assert!(authorize(b"", b"s3cret").is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
