//! Operator endpoints

use axum::{extract::State, Json};
use ikigai_common::db::{load_stats, SessionStats};

use super::error::ApiResult;
use crate::AppState;

/// GET /api/admin/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<SessionStats>> {
    Ok(Json(load_stats(&state.db).await?))
}
