use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateJobRequest, ListJobsQuery, UpdateJobRequest};
use crate::api::dtos::responses::CountResponse;
use crate::domain::models::job::JobStatus;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.into_filter()?;
    let jobs = state.listings.list_jobs(&filter).await?;
    Ok(Json(jobs))
}

pub async fn create_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.lifecycle.create_job(payload.into_new_job(user.id)).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn my_jobs(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let jobs = state.listings.hirer_jobs(&user.id).await?;
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.listings.get_job(job_id).await?;
    Ok(Json(job))
}

pub async fn update_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<i64>,
    Json(payload): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(status) = payload.status {
        let status: JobStatus = status.parse().map_err(AppError::Validation)?;
        if status != JobStatus::Completed {
            return Err(AppError::Validation(format!(
                "Job status can only be set to 'completed' here, not '{}'", status
            )));
        }
        if !payload.details.is_empty() {
            return Err(AppError::Validation("Cannot edit details while completing a job".into()));
        }
        let job = state.lifecycle.mark_job_completed(job_id, &user.id).await?;
        return Ok(Json(job));
    }

    if payload.details.is_empty() {
        return Err(AppError::Validation("Nothing to update".into()));
    }
    let job = state.lifecycle.update_job_details(job_id, &user.id, payload.details).await?;
    Ok(Json(job))
}

pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.lifecycle.delete_job(job_id, &user.id).await?;
    info!("Deleted job: {}", job_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn count_applications(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let count = state.listings.count_applications(job_id).await?;
    Ok(Json(CountResponse { job_id, count }))
}
