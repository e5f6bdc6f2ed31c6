//! Internal API authentication via timestamp and hash validation
//!
//! Callers of protected endpoints (the web front end, operator tools) send
//! `timestamp` (Unix epoch ms) and `hash` query parameters:
//! - Timestamp must be within the configured window in the past and at most 1000ms in the future
//! - Hash is SHA-256 of canonical JSON of the request + the shared secret
//! - Shared secret is stored in the database settings table
//! - A shared secret of 0 disables checking
//!
//! # Pure Functions
//!
//! Apart from secret loading, this module has no HTTP framework or I/O
//! dependencies. The axum middleware lives in the service crate.

use rand::Rng;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

/// Placeholder written into the `hash` field before hashing
pub const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Allowed clock drift for timestamps ahead of server time
pub const MAX_FUTURE_SKEW_MS: i64 = 1000;

// ========================================
// Error Types
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    #[error("Invalid hash")]
    InvalidHash { provided: String, calculated: String },

    /// Database error loading shared secret
    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ========================================
// Shared Secret Management
// ========================================

/// Load shared secret from database settings
///
/// Key `api_shared_secret`, value i64. `0` disables auth checking. A
/// missing secret is generated and stored.
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'api_shared_secret'")
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((Some(value),)) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        _ => initialize_shared_secret(db).await,
    }
}

/// Generate and store a random non-zero shared secret
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let secret: i64 = {
        let mut rng = rand::thread_rng();
        loop {
            let val = rng.gen::<i64>();
            if val != 0 {
                break val;
            }
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('api_shared_secret', ?)")
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Timestamp Validation
// ========================================

/// Validate a request timestamp against `now`
///
/// Accepts timestamps up to `window_ms` in the past and up to
/// [`MAX_FUTURE_SKEW_MS`] in the future.
pub fn validate_timestamp(timestamp: i64, now: i64, window_ms: i64) -> Result<(), ApiAuthError> {
    let diff = now - timestamp;

    if diff > window_ms {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, window_ms),
        });
    }

    if diff < -MAX_FUTURE_SKEW_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_FUTURE_SKEW_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// JSON value a GET request is hashed over
pub fn request_value(path: &str, timestamp: i64) -> Value {
    json!({
        "hash": DUMMY_HASH,
        "path": path,
        "timestamp": timestamp,
    })
}

/// Calculate request hash
///
/// 1. Replace hash field with [`DUMMY_HASH`]
/// 2. Convert to canonical JSON (sorted keys, no whitespace)
/// 3. Append shared secret as decimal i64 string
/// 4. SHA-256, returned as 64 hex characters
pub fn calculate_hash(json_value: &Value, shared_secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let canonical = to_canonical_json(&value);
    let to_hash = format!("{}{}", canonical, shared_secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        // serde_json's Display is compact and escapes strings correctly
        other => other.to_string(),
    }
}

/// Validate hash matches calculated value
pub fn validate_hash(
    provided_hash: &str,
    json_value: &Value,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, shared_secret);

    if !provided_hash.eq_ignore_ascii_case(&calculated) {
        return Err(ApiAuthError::InvalidHash {
            provided: provided_hash.to_string(),
            calculated,
        });
    }

    Ok(())
}

// ========================================
// Tests
// ========================================
