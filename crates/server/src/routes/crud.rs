//! Generic list/get/create/update/delete handlers shared by every table.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::de::DeserializeOwned;
use services::services::{
    store::{Listing, Repository, Resource, Store},
    validation::Validate,
};
use tracing::info;

use super::parse_id;
use crate::{AppState, error::ApiError};

pub async fn list<T>(
    State(state): State<AppState>,
    query: Result<Query<T::Filter>, QueryRejection>,
) -> Result<Json<Vec<T>>, ApiError>
where
    T: Resource,
    T::Filter: DeserializeOwned,
    Store: Listing<T>,
{
    let Query(filter) = query?;
    let rows = Listing::<T>::list(state.store.as_ref(), &filter).await?;
    Ok(Json(rows))
}

pub async fn fetch<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, ApiError>
where
    T: Resource,
    Store: Repository<T>,
{
    let id = parse_id(&id, T::LABEL)?;
    Repository::<T>::find(state.store.as_ref(), id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(T::LABEL))
}

pub async fn create<T>(
    State(state): State<AppState>,
    payload: Result<Json<T::Create>, JsonRejection>,
) -> Result<(StatusCode, Json<T>), ApiError>
where
    T: Resource,
    Store: Repository<T>,
{
    let Json(data) = payload?;
    data.validate()?;
    let row = Repository::<T>::create(state.store.as_ref(), data).await?;
    info!(entity = T::LABEL, id = %row.id(), "Created");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<T::Update>, JsonRejection>,
) -> Result<Json<T>, ApiError>
where
    T: Resource,
    Store: Repository<T>,
{
    let id = parse_id(&id, T::LABEL)?;
    let Json(data) = payload?;
    data.validate()?;
    let row = Repository::<T>::update(state.store.as_ref(), id, data)
        .await?
        .ok_or(ApiError::NotFound(T::LABEL))?;
    info!(entity = T::LABEL, %id, "Updated");
    Ok(Json(row))
}

pub async fn remove<T>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    T: Resource,
    Store: Repository<T>,
{
    let id = parse_id(&id, T::LABEL)?;
    if !Repository::<T>::delete(state.store.as_ref(), id).await? {
        return Err(ApiError::NotFound(T::LABEL));
    }
    info!(entity = T::LABEL, %id, "Deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET|POST {path}` and `GET|PUT|DELETE {path}/{id}`.
pub fn router<T>(path: &str) -> Router<AppState>
where
    T: Resource,
    T::Filter: DeserializeOwned,
    Store: Repository<T> + Listing<T>,
{
    Router::new()
        .route(path, get(list::<T>).post(create::<T>))
        .route(
            &format!("{path}/{{id}}"),
            get(fetch::<T>).put(update::<T>).delete(remove::<T>),
        )
}
