//! Shared HTTP API functionality
//!
//! Pure functions and shared types only; each service wraps these with
//! framework-specific middleware.

pub mod auth;
pub mod types;

pub use auth::{
    calculate_hash, initialize_shared_secret, load_shared_secret, request_value, validate_hash,
    validate_timestamp, ApiAuthError,
};
pub use types::{AuthQuery, ErrorResponse};
