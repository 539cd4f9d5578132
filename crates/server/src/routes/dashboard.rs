use axum::{Json, Router, extract::State, routing::get};
use services::services::dashboard::{DashboardStats, dashboard_stats};

use crate::{AppState, error::ApiError};

/// GET /api/dashboard/stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(dashboard_stats(state.store.as_ref()).await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(get_stats))
}
