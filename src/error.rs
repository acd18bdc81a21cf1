use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Job {0} not found")]
    JobNotFound(i64),
    #[error("Application {0} not found")]
    ApplicationNotFound(i64),
    #[error("Notification {0} not found")]
    NotificationNotFound(i64),
    #[error("Job {0} is not open for applications")]
    JobNotOpen(i64),
    #[error("Cannot move {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
    #[error("You have already applied to this job")]
    DuplicateApplication,
    #[error("Job {0} already has a hired applicant")]
    JobAlreadyAssigned(i64),
    #[error("Only the job owner can do this")]
    NotOwner,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::JobNotFound(_) => "JOB_NOT_FOUND",
            AppError::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            AppError::NotificationNotFound(_) => "NOTIFICATION_NOT_FOUND",
            AppError::JobNotOpen(_) => "JOB_NOT_OPEN",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::DuplicateApplication => "DUPLICATE_APPLICATION",
            AppError::JobAlreadyAssigned(_) => "JOB_ALREADY_ASSIGNED",
            AppError::NotOwner => "NOT_OWNER",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Validation(_) => "VALIDATION",
            AppError::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    /// Connection-level failures worth retrying on idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed
            ),
            AppError::UpstreamUnavailable(_) => true,
            _ => false,
        }
    }

    pub fn invalid_application_transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidTransition { entity: "application", from: from.to_string(), to: to.to_string() }
    }

    pub fn invalid_job_transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidTransition { entity: "job", from: from.to_string(), to: to.to_string() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error()
                    && db_err.is_unique_violation() {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "CONFLICT" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::JobNotFound(_)
            | AppError::ApplicationNotFound(_)
            | AppError::NotificationNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::JobNotOpen(_)
            | AppError::InvalidTransition { .. }
            | AppError::DuplicateApplication
            | AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::JobAlreadyAssigned(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::NotOwner => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::UpstreamUnavailable(msg) => {
                error!("Upstream unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Service temporarily unavailable".to_string())
            }
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
