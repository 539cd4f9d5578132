//! Read-only user lookups. Users are provisioned by the identity provider.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use db::models::user::User;
use services::services::{rbac::Permissions, store::CrmBackend};

use super::parse_id;
use crate::{AppState, error::ApiError};

async fn load_user(state: &AppState, raw_id: &str) -> Result<User, ApiError> {
    let id = parse_id(raw_id, "User")?;
    state
        .store
        .find_user(id)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(load_user(&state, &id).await?))
}

/// GET /api/users/{id}/permissions
pub async fn get_permissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Permissions>, ApiError> {
    let user = load_user(&state, &id).await?;
    Ok(Json(Permissions::for_role(Some(user.effective_role()))))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/permissions", get(get_permissions))
}
