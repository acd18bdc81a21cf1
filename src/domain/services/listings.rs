use std::collections::HashMap;
use std::sync::Arc;
use serde::Serialize;

use crate::domain::models::{
    application::{ApplicationFilter, ApplicationStatus, ApplicationView},
    job::{Job, JobFilter, JobSummary},
};
use crate::domain::ports::{ApplicationRepository, ApplicationViewRepository, JobRepository};
use crate::domain::services::retry::{retry_read, RetryPolicy};
use crate::domain::services::view_state::ViewedSet;
use crate::error::AppError;

/// A hirer's job with everything the management screen shows for it.
#[derive(Debug, Serialize, Clone)]
pub struct HirerJobView {
    #[serde(flatten)]
    pub job: Job,
    pub application_count: i64,
    pub pending_count: i64,
    pub new_count: i64,
    pub applications: Vec<ApplicationView>,
}

pub struct ListingService {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    views: Arc<dyn ApplicationViewRepository>,
    retry: RetryPolicy,
}

impl ListingService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        views: Arc<dyn ApplicationViewRepository>,
        retry: RetryPolicy,
    ) -> Self {
        Self { jobs, applications, views, retry }
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<JobSummary>, AppError> {
        retry_read(self.retry, "list_jobs", || self.jobs.list(filter)).await
    }

    pub async fn get_job(&self, job_id: i64) -> Result<Job, AppError> {
        retry_read(self.retry, "get_job", || self.jobs.find_by_id(job_id)).await?
            .ok_or(AppError::JobNotFound(job_id))
    }

    pub async fn count_applications(&self, job_id: i64) -> Result<i64, AppError> {
        self.get_job(job_id).await?;
        retry_read(self.retry, "count_applications", || self.applications.count_by_job(job_id)).await
    }

    /// Applications matching `filter`. When `viewer_id` owns a listed job, its
    /// rows carry the viewer's `viewed` flag.
    pub async fn list_applications(&self, filter: &ApplicationFilter, viewer_id: Option<&str>) -> Result<Vec<ApplicationView>, AppError> {
        let mut rows = retry_read(self.retry, "list_applications", || self.applications.list_views(filter)).await?;

        if let Some(viewer_id) = viewer_id
            && rows.iter().any(|row| row.poster_id == viewer_id) {
            let viewed: ViewedSet = retry_read(self.retry, "viewed_ids", || self.views.viewed_ids(viewer_id, filter.job_id))
                .await?
                .into_iter()
                .collect();
            for row in rows.iter_mut().filter(|row| row.poster_id == viewer_id) {
                row.viewed = viewed.is_viewed(row.application.id);
            }
        }

        Ok(rows)
    }

    pub async fn hirer_jobs(&self, user_id: &str) -> Result<Vec<HirerJobView>, AppError> {
        let job_filter = JobFilter { user_id: Some(user_id.to_string()), ..Default::default() };
        let jobs = retry_read(self.retry, "hirer_jobs", || self.jobs.list(&job_filter)).await?;
        let application_filter = ApplicationFilter { poster_id: Some(user_id.to_string()), ..Default::default() };
        let applications = self.list_applications(&application_filter, Some(user_id)).await?;

        let mut by_job: HashMap<i64, Vec<ApplicationView>> = HashMap::new();
        for row in applications {
            by_job.entry(row.application.job_id).or_default().push(row);
        }

        Ok(jobs
            .into_iter()
            .map(|summary| {
                let applications = by_job.remove(&summary.job.id).unwrap_or_default();
                let pending: Vec<&ApplicationView> = applications
                    .iter()
                    .filter(|row| row.application.status == ApplicationStatus::Pending)
                    .collect();
                let pending_count = pending.len() as i64;
                let new_count = pending.iter().filter(|row| !row.viewed).count() as i64;
                HirerJobView {
                    job: summary.job,
                    application_count: summary.application_count,
                    pending_count,
                    new_count,
                    applications,
                }
            })
            .collect())
    }
}
