//! ikigai-api library - premium access service
//!
//! Serves resolved premium results, accepts payment webhooks that assign
//! tiers, and exposes operator statistics.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use ikigai_common::config::DEFAULT_CACHE_CAPACITY;
use ikigai_common::db::RuntimeSettings;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod logging;

use cache::ResultsCache;

/// Largest webhook body accepted
pub const WEBHOOK_BODY_LIMIT: usize = 64 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Shared secret for internal API authentication (0 disables)
    pub shared_secret: i64,
    pub settings: RuntimeSettings,
    /// HMAC key for payment webhooks; `None` disables the endpoint
    pub webhook_secret: Option<String>,
    pub cache: Arc<ResultsCache>,
}

impl AppState {
    /// Create application state with default settings and no webhook secret
    pub fn new(db: SqlitePool, shared_secret: i64) -> Self {
        Self {
            db,
            shared_secret,
            settings: RuntimeSettings::default(),
            webhook_secret: None,
            cache: Arc::new(ResultsCache::new(DEFAULT_CACHE_CAPACITY)),
        }
    }

    pub fn with_settings(mut self, settings: RuntimeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = Arc::new(ResultsCache::new(capacity));
        self
    }
}

/// Build application router
///
/// - Protected routes require timestamp + hash query parameters
/// - The webhook authenticates with its own signature header
/// - Health and build info are public
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/premium-results/:session_id", get(api::get_premium_results))
        .route("/api/admin/stats", get(api::get_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let webhooks = Router::new()
        .route("/api/webhooks/payment", post(api::payment_webhook))
        .layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT));

    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(webhooks)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
