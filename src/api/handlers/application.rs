use axum::{extract::{State, Query}, http::StatusCode, response::{IntoResponse, Response}, Json};
use crate::state::AppState;
use crate::api::extractors::{auth::AuthUser, maybe_auth::MaybeAuthUser};
use crate::api::dtos::requests::{ListApplicationsQuery, SubmitApplicationRequest, UpdateApplicationRequest};
use crate::api::dtos::responses::HireResponse;
use crate::domain::models::application::ApplicationStatus;
use crate::error::AppError;
use std::sync::Arc;

pub async fn list_applications(
    State(state): State<Arc<AppState>>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.into_filter()?;
    let viewer_id = user.as_ref().map(|u| u.id.as_str());
    let applications = state.listings.list_applications(&filter, viewer_id).await?;
    Ok(Json(applications))
}

pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SubmitApplicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(job_id), Some(applicant_id)) = (payload.job_id, payload.applicant_id) else {
        return Err(AppError::Validation("job_id and applicant_id are required".into()));
    };
    if applicant_id != user.id {
        return Err(AppError::Validation("applicant_id must be the signed-in user".into()));
    }

    let application = state.lifecycle.submit_application(job_id, &applicant_id, payload.message).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// `PATCH /api/applications`: the target status picks the lifecycle operation.
pub async fn update_application(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateApplicationRequest>,
) -> Result<Response, AppError> {
    let (Some(application_id), Some(status)) = (payload.id, payload.status) else {
        return Err(AppError::Validation("id and status are required".into()));
    };
    let status: ApplicationStatus = status.parse().map_err(AppError::Validation)?;

    let response = match status {
        ApplicationStatus::Accepted => {
            Json(state.lifecycle.accept_application(application_id, &user.id).await?).into_response()
        }
        ApplicationStatus::Declined => {
            Json(state.lifecycle.decline_application(application_id, &user.id).await?).into_response()
        }
        ApplicationStatus::Pending => {
            Json(state.lifecycle.reconsider_application(application_id, &user.id).await?).into_response()
        }
        ApplicationStatus::Hired => {
            let scheduled_date = payload.scheduled_date
                .ok_or_else(|| AppError::Validation("scheduled_date is required to hire".into()))?;
            let application = state.application_repo.find_by_id(application_id).await?
                .ok_or(AppError::ApplicationNotFound(application_id))?;
            let outcome = state.lifecycle
                .hire_applicant(application.job_id, application_id, scheduled_date, &user.id)
                .await?;
            Json(HireResponse { job: outcome.job, application: outcome.application }).into_response()
        }
    };

    Ok(response)
}
