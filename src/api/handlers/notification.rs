use axum::{extract::{State, Path, Query}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CreateNotificationRequest, ListNotificationsQuery};
use crate::api::dtos::responses::MarkedReadResponse;
use crate::domain::models::notification::{NewNotification, NotificationData, NOTIFICATION_TYPES};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(user_id), Some(kind), Some(title)) = (payload.user_id, payload.kind, payload.title) else {
        return Err(AppError::Validation("user_id, type and title are required".into()));
    };
    if !NOTIFICATION_TYPES.contains(&kind.as_str()) {
        return Err(AppError::Validation(format!("Invalid notification type '{}'", kind)));
    }

    let notification = state.notification_repo.create(&NewNotification {
        user_id,
        kind,
        title,
        description: payload.description.unwrap_or_default(),
        data: NotificationData { job_id: payload.job_id, application_id: payload.application_id },
    }).await?;
    info!(notification_id = notification.id, user_id = %notification.user_id, "Notification created");
    Ok((StatusCode::CREATED, Json(notification)))
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notification_repo.list_for_user(&user.id, query.unread).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let notification = state.notification_repo.mark_read(notification_id, &user.id).await?
        .ok_or(AppError::NotificationNotFound(notification_id))?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.notification_repo.mark_all_read(&user.id).await?;
    Ok(Json(MarkedReadResponse { updated }))
}
