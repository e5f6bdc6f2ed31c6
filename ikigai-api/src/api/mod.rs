//! HTTP API handlers for ikigai-api

pub mod admin;
pub mod auth;
pub mod buildinfo;
pub mod error;
pub mod health;
pub mod premium;
pub mod webhook;

pub use admin::get_stats;
pub use auth::auth_middleware;
pub use buildinfo::get_build_info;
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use premium::get_premium_results;
pub use webhook::payment_webhook;
