//! Request gate that applies the role check when enforcement is enabled.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use services::services::{rbac::Action, store::CrmBackend};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{AppState, USER_ID_HEADER, error::ApiError};

pub fn action_for(method: &Method) -> Action {
    match *method {
        Method::POST => Action::Create,
        Method::PUT | Method::PATCH => Action::Update,
        Method::DELETE => Action::Delete,
        _ => Action::View,
    }
}

fn caller_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

/// Callers are identified by the `X-User-Id` header; an unknown or missing
/// user has no role and is denied everything.
pub async fn require_permission(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.rbac.is_active() {
        return Ok(next.run(request).await);
    }

    let action = action_for(request.method());
    let caller = caller_id(request.headers());
    let role = match caller {
        Some(id) => state
            .store
            .find_user(id)
            .await?
            .map(|user| user.effective_role()),
        None => None,
    };

    if !state.rbac.allows(role, action) {
        warn!(
            caller = ?caller,
            role = ?role,
            %action,
            path = %request.uri().path(),
            "Permission denied"
        );
        return Err(ApiError::Forbidden);
    }

    debug!(caller = ?caller, %action, "Permission granted");
    Ok(next.run(request).await)
}
