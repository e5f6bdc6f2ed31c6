//! Shared API request/response types

use serde::{Deserialize, Serialize};

// ========================================
// Authentication Types
// ========================================

/// Authentication parameters for GET requests (query parameters)
///
/// ```
/// // GET /api/admin/stats?timestamp=1730000000000&hash=abc123...
/// use ikigai_common::api::types::AuthQuery;
///
/// let query = AuthQuery {
///     timestamp: 1730000000000,
///     hash: "abc123...".to_string(),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthQuery {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

// ========================================
// Error Response Types
// ========================================

/// JSON error body returned by every endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable machine-readable code
    pub code: &'static str,
}

impl ErrorResponse {
    pub fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}
