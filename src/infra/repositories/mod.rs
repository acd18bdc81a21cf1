use crate::error::AppError;

pub mod sqlite_job_repo;
pub mod sqlite_application_repo;
pub mod sqlite_notification_repo;
pub mod sqlite_conversation_repo;
pub mod sqlite_application_view_repo;

pub mod postgres_job_repo;
pub mod postgres_application_repo;
pub mod postgres_notification_repo;
pub mod postgres_conversation_repo;
pub mod postgres_application_view_repo;

/// The `(job_id, applicant_id)` unique index is the backstop for the
/// pre-insert duplicate check; both surface the same error.
pub(crate) fn map_application_insert_error(e: sqlx::Error) -> AppError {
    let is_duplicate = e.as_database_error().is_some_and(|db| db.is_unique_violation());
    if is_duplicate {
        AppError::DuplicateApplication
    } else {
        AppError::Database(e)
    }
}
