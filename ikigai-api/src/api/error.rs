//! Handler error type
//!
//! Every variant maps to a status code and a stable `code` string in the
//! JSON body `{"error": ..., "code": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ikigai_common::api::ErrorResponse;
use ikigai_common::signature::SignatureError;
use ikigai_common::AccessError;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Test is not completed")]
    TestIncomplete,

    #[error("Unrecognized premium tier '{tier}' on session {session_id}")]
    TierConfiguration { session_id: Uuid, tier: String },

    #[error("Completed session {0} has no results")]
    ResultsMissing(Uuid),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error("Payment webhook is not configured")]
    WebhookDisabled,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Database error: {0}")]
    Database(#[from] ikigai_common::Error),
}

impl ApiError {
    /// Map a resolver refusal for a given session
    pub fn from_access(session_id: Uuid, err: AccessError) -> Self {
        match err {
            AccessError::Incomplete => ApiError::TestIncomplete,
            AccessError::UnrecognizedTier(unknown) => ApiError::TierConfiguration {
                session_id,
                tier: unknown.0,
            },
            AccessError::MissingResults(id) => ApiError::ResultsMissing(id),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidSessionId(_) | ApiError::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TestIncomplete => StatusCode::CONFLICT,
            ApiError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            ApiError::WebhookDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::TierConfiguration { .. }
            | ApiError::ResultsMissing(_)
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiError::InvalidSessionId(_) => "INVALID_SESSION_ID",
            ApiError::TestIncomplete => "TEST_INCOMPLETE",
            ApiError::TierConfiguration { .. } => "TIER_CONFIGURATION",
            ApiError::ResultsMissing(_) => "RESULTS_MISSING",
            ApiError::InvalidSignature(_) => "INVALID_SIGNATURE",
            ApiError::WebhookDisabled => "WEBHOOK_DISABLED",
            ApiError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::InvalidSignature(_) => warn!("Rejected webhook delivery: {}", self),
            _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                error!("{}", self)
            }
            _ => {}
        }

        // Internal details stay in the log
        let message = match &self {
            ApiError::Database(_) => "Database error".to_string(),
            ApiError::InvalidSignature(_) => "Invalid signature".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse::new(self.code(), message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
