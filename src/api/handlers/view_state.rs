use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::ViewedQuery;
use crate::api::dtos::responses::{CountResponse, ViewedResponse};
use crate::error::AppError;
use std::sync::Arc;

pub async fn mark_viewed(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.view_state.mark_viewed(&user.id, application_id).await?;
    Ok(Json(ViewedResponse { application_id, viewed: true }))
}

pub async fn is_viewed(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(application_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let viewed = state.view_state.is_viewed(&user.id, application_id).await?;
    Ok(Json(ViewedResponse { application_id, viewed }))
}

/// The caller's viewed map, in the shape the browser cache stores.
pub async fn viewed_set(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ViewedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let viewed = state.view_state.viewed_set(&user.id, query.job_id).await?;
    Ok(Json(viewed))
}

pub async fn new_count(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.view_state.new_count(&user.id, job_id).await?;
    Ok(Json(CountResponse { job_id, count }))
}
