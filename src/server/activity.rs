use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::ActivityParams;
use crate::server::response::{ApiError, ApiResponse};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

pub async fn list_activity(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = state.store.list_activity(limit)?;
    Ok(Json(ApiResponse::success(entries)))
}
