//! Authentication middleware for protected routes
//!
//! GET requests carry `timestamp` and `hash` as query parameters. The hash
//! covers the request path, so a valid hash for one session cannot be
//! replayed against another.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use ikigai_common::api::auth::{request_value, validate_hash, validate_timestamp, ApiAuthError};
use ikigai_common::api::{AuthQuery, ErrorResponse};
use ikigai_common::time::now_millis;
use tracing::warn;

use crate::AppState;

/// Authentication middleware
///
/// Returns 401 for a bad timestamp or hash and 400 when the parameters are
/// missing. A shared secret of 0 passes every request through.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let Query(auth) = Query::<AuthQuery>::try_from_uri(request.uri())
        .map_err(|e| AuthError::MissingFields(e.body_text()))?;

    validate_timestamp(auth.timestamp, now_millis(), state.settings.auth_window_ms).map_err(
        |e| match e {
            ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
            other => AuthError::Other(other.to_string()),
        },
    )?;

    let path = request.uri().path();
    let value = request_value(path, auth.timestamp);
    validate_hash(&auth.hash, &value, state.shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidHash { provided, .. } => {
            warn!("Hash validation failed for {}: provided={}", path, provided);
            AuthError::InvalidHash
        }
        other => AuthError::Other(other.to_string()),
    })?;

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TIMESTAMP",
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidHash => (
                StatusCode::UNAUTHORIZED,
                "INVALID_HASH",
                "Invalid hash".to_string(),
            ),
            AuthError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "MISSING_AUTH_FIELDS",
                format!("Missing required fields: {}", msg),
            ),
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_ERROR",
                format!("Authentication error: {}", msg),
            ),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
