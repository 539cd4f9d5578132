//! Lead routes. Everything except the list is the shared CRUD handler set;
//! the list is a filtered, paginated search.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use db::models::lead::Lead;
use services::services::{lead_filter::LeadQuery, store::CrmBackend};
use tracing::debug;
use utils::response::Paginated;

use super::crud;
use crate::{AppState, error::ApiError};

/// GET /api/leads?search=&status=&client_domain=&startDate=&endDate=&page=&pageSize=
pub async fn search_leads(
    State(state): State<AppState>,
    query: Result<Query<LeadQuery>, QueryRejection>,
) -> Result<Json<Paginated<Lead>>, ApiError> {
    let Query(query) = query?;
    let (filter, pagination) = query.resolve()?;
    let (leads, total) = state.store.search_leads(&filter, pagination).await?;
    debug!(
        total,
        page = pagination.page,
        page_size = pagination.page_size,
        returned = leads.len(),
        "Lead search"
    );
    Ok(Json(Paginated::new(
        leads,
        total,
        pagination.page,
        pagination.page_size,
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leads", get(search_leads).post(crud::create::<Lead>))
        .route(
            "/leads/{id}",
            get(crud::fetch::<Lead>)
                .put(crud::update::<Lead>)
                .delete(crud::remove::<Lead>),
        )
}
