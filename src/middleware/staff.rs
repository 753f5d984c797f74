//! Staff authentication for the administration API
//!
//! Requests must carry `Authorization: Bearer <INVITE_STAFF_TOKEN>`.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Reject requests without the configured staff bearer token.
///
/// Returns 403 for every request when no staff token is configured and 401
/// when the header is missing or does not match.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.staff_token.as_deref() else {
        tracing::warn!("Staff API called but INVITE_STAFF_TOKEN is not set");
        return AppError::Forbidden("Staff API is disabled".to_string()).into_response();
    };

    match extract_bearer_token(&req) {
        Some(token) if tokens_match(token, expected) => next.run(req).await,
        Some(_) => AppError::Unauthorized("Invalid staff token".to_string()).into_response(),
        None => AppError::Unauthorized("Missing or invalid Authorization header".to_string())
            .into_response(),
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<&str> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(str::trim)
}

/// Comparison whose duration does not depend on where the inputs differ
fn tokens_match(given: &str, expected: &str) -> bool {
    let given = given.as_bytes();
    let expected = expected.as_bytes();
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
