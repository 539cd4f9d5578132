use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use services::services::health::{HealthReport, check_health};

use crate::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = check_health(state.store.as_ref()).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
