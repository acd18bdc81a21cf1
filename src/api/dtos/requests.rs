use crate::domain::models::{
    application::{ApplicationFilter, ApplicationStatus},
    job::{JobDetailsPatch, JobFilter, JobStatus, NewJob, Recurrence},
};
use crate::error::AppError;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub service_type: String,
    pub scheduled_date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
}

impl CreateJobRequest {
    pub fn into_new_job(self, owner_id: String) -> NewJob {
        NewJob {
            title: self.title,
            description: self.description,
            location: self.location,
            city: self.city,
            province: self.province,
            postal_code: self.postal_code,
            service_type: self.service_type,
            user_id: owner_id,
            scheduled_date: self.scheduled_date,
            recurrence: self.recurrence,
        }
    }
}

/// Body of `PATCH /api/jobs/{id}`. Either a details edit or `status: "completed"`.
#[derive(Deserialize)]
pub struct UpdateJobRequest {
    pub status: Option<String>,
    #[serde(flatten)]
    pub details: JobDetailsPatch,
}

#[derive(Deserialize, Default)]
pub struct ListJobsQuery {
    pub status: Option<String>,
    pub user_id: Option<String>,
    pub service_type: Option<String>,
}

impl ListJobsQuery {
    pub fn into_filter(self) -> Result<JobFilter, AppError> {
        let status = self.status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<JobStatus>())
            .transpose()
            .map_err(AppError::Validation)?;
        Ok(JobFilter {
            status,
            user_id: self.user_id.filter(|s| !s.is_empty()),
            service_type: self.service_type.filter(|s| !s.is_empty()),
        })
    }
}

#[derive(Deserialize)]
pub struct SubmitApplicationRequest {
    pub job_id: Option<i64>,
    pub applicant_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateApplicationRequest {
    pub id: Option<i64>,
    pub status: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Deserialize, Default)]
pub struct ListApplicationsQuery {
    pub job_id: Option<i64>,
    /// Poster of the job the applications belong to.
    pub user_id: Option<String>,
    pub worker_id: Option<String>,
    pub status: Option<String>,
}

impl ListApplicationsQuery {
    pub fn into_filter(self) -> Result<ApplicationFilter, AppError> {
        let status = self.status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ApplicationStatus>())
            .transpose()
            .map_err(AppError::Validation)?;
        Ok(ApplicationFilter {
            job_id: self.job_id,
            poster_id: self.user_id.filter(|s| !s.is_empty()),
            worker_id: self.worker_id.filter(|s| !s.is_empty()),
            status,
        })
    }
}

#[derive(Deserialize)]
pub struct ViewedQuery {
    pub job_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateNotificationRequest {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_id: Option<i64>,
    pub application_id: Option<i64>,
}

#[derive(Deserialize, Default)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread: bool,
}
