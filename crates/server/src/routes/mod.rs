use axum::{Router, middleware::from_fn_with_state};
use db::models::{company::Company, deal::Deal, interaction::Interaction, task::Task};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::require_permission};

pub mod crud;
pub mod dashboard;
pub mod health;
pub mod leads;
pub mod users;

/// Path ids that are not UUIDs cannot name an existing row.
pub(crate) fn parse_id(raw: &str, label: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(label))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let guarded = Router::new()
        .merge(leads::router())
        .merge(crud::router::<Company>("/companies"))
        .merge(crud::router::<Interaction>("/interactions"))
        .merge(crud::router::<Deal>("/deals"))
        .merge(crud::router::<Task>("/tasks"))
        .merge(users::router())
        .merge(dashboard::router())
        .route_layer(from_fn_with_state(state.clone(), require_permission));

    Router::new().nest("/api", guarded.merge(health::router()))
}
