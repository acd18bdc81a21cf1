use crate::domain::models::{
    job::{Job, JobFilter, JobStatus, JobSummary, NewJob},
    application::{Application, ApplicationFilter, ApplicationStatus, ApplicationView, NewApplication},
    notification::{NewNotification, Notification},
    conversation::{Conversation, Message},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &NewJob) -> Result<Job, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Job>, AppError>;
    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobSummary>, AppError>;
    /// Writes the editable fields. Returns `None` if the job is no longer open.
    async fn update_details(&self, job: &Job) -> Result<Option<Job>, AppError>;
    /// Conditional write to `completed`; `None` when the current status is not in `allowed_from`.
    async fn complete(&self, id: i64, allowed_from: &[JobStatus], completed_at: DateTime<Utc>) -> Result<Option<Job>, AppError>;
    /// Deletes an open job together with its applications and their view flags.
    /// Returns `false` (and deletes nothing) if the job is missing or not open.
    async fn delete_open(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `DuplicateApplication` when the (job, applicant) pair exists.
    async fn create(&self, application: &NewApplication) -> Result<Application, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Application>, AppError>;
    async fn find_by_job_and_applicant(&self, job_id: i64, applicant_id: &str) -> Result<Option<Application>, AppError>;
    async fn list_by_job(&self, job_id: i64) -> Result<Vec<Application>, AppError>;
    async fn list_views(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationView>, AppError>;
    async fn count_by_job(&self, job_id: i64) -> Result<i64, AppError>;
    async fn find_hired_for_job(&self, job_id: i64) -> Result<Option<Application>, AppError>;
    /// Conditional write keyed on `to.allowed_from()`. `None` when the row was not in an allowed state.
    async fn transition(&self, id: i64, to: ApplicationStatus) -> Result<Option<Application>, AppError>;
    /// Single transaction: job `open -> assigned`, application `accepted -> hired`.
    async fn hire(&self, job_id: i64, application_id: i64, scheduled_date: NaiveDate) -> Result<(Job, Application), AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError>;
    async fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, id: i64, user_id: &str) -> Result<Option<Notification>, AppError>;
    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_or_create(&self, job_id: i64, hirer_id: &str, worker_id: &str) -> Result<Conversation, AppError>;
    async fn send_message(&self, conversation_id: i64, sender_id: &str, content: &str) -> Result<Message, AppError>;
    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, AppError>;
}

#[async_trait]
pub trait ApplicationViewRepository: Send + Sync {
    async fn mark_viewed(&self, user_id: &str, application_id: i64) -> Result<(), AppError>;
    async fn is_viewed(&self, user_id: &str, application_id: i64) -> Result<bool, AppError>;
    /// Viewed application ids for one job, or across all jobs when `job_id` is `None`.
    async fn viewed_ids(&self, user_id: &str, job_id: Option<i64>) -> Result<Vec<i64>, AppError>;
}
