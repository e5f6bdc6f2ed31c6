//! Premium results endpoint

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use ikigai_common::db::load_session;
use ikigai_common::{resolve_premium_results, PremiumTier};
use tracing::debug;
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/premium-results/:session_id
///
/// Loads the session, resolves its feature access and returns the filtered
/// detailed analysis. Responds 409 for an unfinished test and 200 with every
/// feature locked when nothing was purchased.
pub async fn get_premium_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let id = Uuid::parse_str(session_id.trim())
        .map_err(|_| ApiError::InvalidSessionId(session_id.clone()))?;

    let session = load_session(&state.db, id)
        .await?
        .ok_or(ApiError::SessionNotFound(id))?;

    let cache_key = session
        .premium_tier
        .as_deref()
        .filter(|_| session.is_completed)
        .and_then(|tier| tier.parse::<PremiumTier>().ok());

    if let Some(tier) = cache_key {
        if let Some(cached) = state.cache.get(id, tier).await {
            debug!("Premium results cache hit for {} ({})", id, tier);
            return Ok(Json(cached.as_ref()).into_response());
        }
    }

    let results = resolve_premium_results(&session).map_err(|e| ApiError::from_access(id, e))?;
    let results = state.cache.insert(results).await;

    Ok(Json(results.as_ref()).into_response())
}
