use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::models::application::{Application, ApplicationStatus};
use crate::domain::ports::{ApplicationRepository, ApplicationViewRepository, JobRepository};
use crate::error::AppError;

/// Which applications a hirer has opened. Serializes to the browser cache
/// shape `{"<applicationId>": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewedSet(BTreeMap<i64, bool>);

impl ViewedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not already marked.
    pub fn mark_viewed(&mut self, application_id: i64) -> bool {
        self.0.insert(application_id, true) != Some(true)
    }

    pub fn is_viewed(&self, application_id: i64) -> bool {
        self.0.get(&application_id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.values().filter(|viewed| **viewed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending applications the hirer has not opened yet.
    pub fn new_count(&self, applications: &[Application]) -> usize {
        applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Pending && !self.is_viewed(a.id))
            .count()
    }
}

impl FromIterator<i64> for ViewedSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().map(|id| (id, true)).collect())
    }
}

/// Server-side viewed flags per (user, application), shared across devices.
pub struct ViewStateTracker {
    views: Arc<dyn ApplicationViewRepository>,
    applications: Arc<dyn ApplicationRepository>,
    jobs: Arc<dyn JobRepository>,
}

impl ViewStateTracker {
    pub fn new(
        views: Arc<dyn ApplicationViewRepository>,
        applications: Arc<dyn ApplicationRepository>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self { views, applications, jobs }
    }

    pub async fn mark_viewed(&self, user_id: &str, application_id: i64) -> Result<(), AppError> {
        let application = self.applications.find_by_id(application_id).await?
            .ok_or(AppError::ApplicationNotFound(application_id))?;
        let job = self.jobs.find_by_id(application.job_id).await?
            .ok_or(AppError::JobNotFound(application.job_id))?;
        if !job.is_owned_by(user_id) {
            return Err(AppError::NotOwner);
        }

        self.views.mark_viewed(user_id, application_id).await?;
        debug!(user_id, application_id, "Application marked as viewed");
        Ok(())
    }

    pub async fn is_viewed(&self, user_id: &str, application_id: i64) -> Result<bool, AppError> {
        self.views.is_viewed(user_id, application_id).await
    }

    pub async fn viewed_set(&self, user_id: &str, job_id: Option<i64>) -> Result<ViewedSet, AppError> {
        Ok(self.views.viewed_ids(user_id, job_id).await?.into_iter().collect())
    }

    pub async fn new_count(&self, user_id: &str, job_id: i64) -> Result<i64, AppError> {
        if self.jobs.find_by_id(job_id).await?.is_none() {
            return Err(AppError::JobNotFound(job_id));
        }
        let applications = self.applications.list_by_job(job_id).await?;
        let viewed = self.viewed_set(user_id, Some(job_id)).await?;
        Ok(viewed.new_count(&applications) as i64)
    }
}
