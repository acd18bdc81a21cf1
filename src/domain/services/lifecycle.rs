//! Job and application lifecycle.
//!
//! Every status change on `jobs` and `job_applications` goes through
//! [`LifecycleEngine`]. Each operation validates the transition, performs a
//! conditional write keyed on the expected prior status, and then emits its
//! notification. Notifications, conversations and messages are best-effort:
//! a failure is logged and never undoes the primary write.

use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use crate::domain::models::{
    application::{Application, ApplicationStatus, NewApplication},
    conversation::default_application_message,
    job::{Job, JobDetailsPatch, JobStatus, NewJob},
    notification::NewNotification,
};
use crate::domain::ports::{ApplicationRepository, ConversationRepository, JobRepository, NotificationRepository};
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    /// Lets an owner complete a job nobody was hired for (`open -> completed`).
    pub allow_complete_unassigned: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self { allow_complete_unassigned: true }
    }
}

impl LifecyclePolicy {
    pub fn may_complete_from(&self, from: JobStatus) -> bool {
        from.can_transition_to(JobStatus::Completed)
            && (from != JobStatus::Open || self.allow_complete_unassigned)
    }

    /// Prior statuses the conditional completion write accepts.
    pub fn completable_from(&self) -> Vec<JobStatus> {
        [JobStatus::Open, JobStatus::Assigned, JobStatus::Completed]
            .into_iter()
            .filter(|status| self.may_complete_from(*status))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct HireOutcome {
    pub job: Job,
    pub application: Application,
}

pub struct LifecycleEngine {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    notifications: Arc<dyn NotificationRepository>,
    conversations: Arc<dyn ConversationRepository>,
    policy: LifecyclePolicy,
}

impl LifecycleEngine {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        notifications: Arc<dyn NotificationRepository>,
        conversations: Arc<dyn ConversationRepository>,
        policy: LifecyclePolicy,
    ) -> Self {
        Self { jobs, applications, notifications, conversations, policy }
    }

    pub async fn create_job(&self, new_job: NewJob) -> Result<Job, AppError> {
        new_job.validate().map_err(AppError::Validation)?;
        let job = self.jobs.create(&new_job).await?;
        info!(job_id = job.id, user_id = %job.user_id, "Job posted: {}", job.title);
        Ok(job)
    }

    pub async fn update_job_details(&self, job_id: i64, requester_id: &str, patch: JobDetailsPatch) -> Result<Job, AppError> {
        let mut job = self.load_job(job_id).await?;
        ensure_owner(&job, requester_id)?;
        if job.status != JobStatus::Open {
            return Err(AppError::Validation(format!("Job {} can only be edited while open", job_id)));
        }

        patch.apply(&mut job).map_err(AppError::Validation)?;

        match self.jobs.update_details(&job).await? {
            Some(updated) => {
                info!(job_id, "Job details updated");
                Ok(updated)
            }
            None => Err(AppError::Validation(format!("Job {} can only be edited while open", job_id))),
        }
    }

    pub async fn submit_application(&self, job_id: i64, applicant_id: &str, message: Option<String>) -> Result<Application, AppError> {
        let job = self.load_job(job_id).await?;
        if job.status != JobStatus::Open {
            return Err(AppError::JobNotOpen(job_id));
        }
        if job.is_owned_by(applicant_id) {
            return Err(AppError::Validation("You cannot apply to your own job".into()));
        }
        if self.applications.find_by_job_and_applicant(job_id, applicant_id).await?.is_some() {
            return Err(AppError::DuplicateApplication);
        }

        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let application = self.applications.create(&NewApplication {
            job_id,
            applicant_id: applicant_id.to_string(),
            message: message.clone(),
        }).await?;
        info!(job_id, application_id = application.id, applicant_id, "Application submitted");

        let content = message.unwrap_or_else(|| default_application_message(&job.title));
        self.open_conversation(&job, applicant_id, &content).await;
        self.notify(NewNotification::new_application(&job.user_id, job.id, application.id, &job.title)).await;

        Ok(application)
    }

    pub async fn accept_application(&self, application_id: i64, requester_id: &str) -> Result<Application, AppError> {
        let (application, job) = self.load_owned_application(application_id, requester_id).await?;
        let accepted = self.transition(&application, ApplicationStatus::Accepted).await?;

        self.notify(NewNotification::application_accepted(&accepted.applicant_id, job.id, accepted.id, &job.title)).await;
        Ok(accepted)
    }

    pub async fn decline_application(&self, application_id: i64, requester_id: &str) -> Result<Application, AppError> {
        let (application, job) = self.load_owned_application(application_id, requester_id).await?;
        let declined = self.transition(&application, ApplicationStatus::Declined).await?;

        self.notify(NewNotification::application_declined(&declined.applicant_id, job.id, declined.id, &job.title)).await;
        Ok(declined)
    }

    /// Moves a declined application back to pending.
    pub async fn reconsider_application(&self, application_id: i64, requester_id: &str) -> Result<Application, AppError> {
        let (application, job) = self.load_owned_application(application_id, requester_id).await?;
        if !application.status.can_transition_to(ApplicationStatus::Pending) {
            return Err(AppError::invalid_application_transition(application.status, ApplicationStatus::Pending));
        }
        if job.status != JobStatus::Open {
            return Err(AppError::JobNotOpen(job.id));
        }
        self.transition(&application, ApplicationStatus::Pending).await
    }

    pub async fn hire_applicant(
        &self,
        job_id: i64,
        application_id: i64,
        scheduled_date: NaiveDate,
        requester_id: &str,
    ) -> Result<HireOutcome, AppError> {
        let (application, job) = self.load_owned_application(application_id, requester_id).await?;
        if application.job_id != job_id {
            return Err(AppError::Validation(format!("Application {} does not belong to job {}", application_id, job_id)));
        }
        if application.status != ApplicationStatus::Accepted {
            return Err(AppError::invalid_application_transition(application.status, ApplicationStatus::Hired));
        }
        match job.status {
            JobStatus::Open => {}
            JobStatus::Assigned => return Err(AppError::JobAlreadyAssigned(job_id)),
            JobStatus::Completed => return Err(AppError::invalid_job_transition(job.status, JobStatus::Assigned)),
        }

        let (job, application) = self.applications.hire(job_id, application_id, scheduled_date).await?;
        info!(job_id, application_id, %scheduled_date, "Applicant hired, job assigned");

        self.notify(NewNotification::hired(&application.applicant_id, job.id, application.id, &job.title)).await;
        Ok(HireOutcome { job, application })
    }

    pub async fn mark_job_completed(&self, job_id: i64, requester_id: &str) -> Result<Job, AppError> {
        let job = self.load_job(job_id).await?;
        ensure_owner(&job, requester_id)?;

        if !self.policy.may_complete_from(job.status) {
            return Err(AppError::invalid_job_transition(job.status, JobStatus::Completed));
        }

        let allowed_from = self.policy.completable_from();
        let completed = match self.jobs.complete(job_id, &allowed_from, Utc::now()).await? {
            Some(completed) => completed,
            None => {
                let current = self.load_job(job_id).await?;
                return Err(AppError::invalid_job_transition(current.status, JobStatus::Completed));
            }
        };
        info!(job_id, from = %job.status, "Job completed");

        match self.applications.find_hired_for_job(job_id).await {
            Ok(Some(hired)) => {
                self.notify(NewNotification::job_completed(&hired.applicant_id, job_id, hired.id, &completed.title)).await;
            }
            Ok(None) => {}
            Err(e) => warn!(job_id, "Could not look up hired applicant for completion notice: {}", e),
        }

        Ok(completed)
    }

    /// Deletes an open job and, with it, every application and view flag on it.
    pub async fn delete_job(&self, job_id: i64, requester_id: &str) -> Result<(), AppError> {
        let job = self.load_job(job_id).await?;
        ensure_owner(&job, requester_id)?;
        if job.status != JobStatus::Open {
            return Err(AppError::invalid_job_transition(job.status, "deleted"));
        }

        if !self.jobs.delete_open(job_id).await? {
            let current = self.load_job(job_id).await?;
            return Err(AppError::invalid_job_transition(current.status, "deleted"));
        }
        info!(job_id, "Job deleted with its applications");
        Ok(())
    }

    async fn load_job(&self, job_id: i64) -> Result<Job, AppError> {
        self.jobs.find_by_id(job_id).await?.ok_or(AppError::JobNotFound(job_id))
    }

    async fn load_owned_application(&self, application_id: i64, requester_id: &str) -> Result<(Application, Job), AppError> {
        let application = self.applications.find_by_id(application_id).await?
            .ok_or(AppError::ApplicationNotFound(application_id))?;
        let job = self.load_job(application.job_id).await?;
        ensure_owner(&job, requester_id)?;
        Ok((application, job))
    }

    async fn transition(&self, application: &Application, to: ApplicationStatus) -> Result<Application, AppError> {
        if !application.status.can_transition_to(to) {
            return Err(AppError::invalid_application_transition(application.status, to));
        }

        match self.applications.transition(application.id, to).await? {
            Some(updated) => {
                info!(application_id = updated.id, from = %application.status, to = %to, "Application status changed");
                Ok(updated)
            }
            None => {
                // Lost a race with another writer; report what the row holds now.
                let current = self.applications.find_by_id(application.id).await?
                    .ok_or(AppError::ApplicationNotFound(application.id))?;
                Err(AppError::invalid_application_transition(current.status, to))
            }
        }
    }

    async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.notifications.create(&notification).await {
            warn!(
                user_id = %notification.user_id,
                kind = %notification.kind,
                "Notification not delivered (best-effort): {}", e
            );
        }
    }

    async fn open_conversation(&self, job: &Job, applicant_id: &str, content: &str) {
        let conversation = match self.conversations.find_or_create(job.id, &job.user_id, applicant_id).await {
            Ok(conversation) => conversation,
            Err(e) => {
                warn!(job_id = job.id, applicant_id, "Conversation not created (best-effort): {}", e);
                return;
            }
        };
        if let Err(e) = self.conversations.send_message(conversation.id, applicant_id, content).await {
            warn!(conversation_id = conversation.id, "Application message not sent (best-effort): {}", e);
        }
    }
}

fn ensure_owner(job: &Job, requester_id: &str) -> Result<(), AppError> {
    if job.is_owned_by(requester_id) {
        Ok(())
    } else {
        Err(AppError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_policy() {
        let permissive = LifecyclePolicy::default();
        assert_eq!(permissive.completable_from(), vec![JobStatus::Open, JobStatus::Assigned]);
        assert!(!permissive.may_complete_from(JobStatus::Completed));

        let strict = LifecyclePolicy { allow_complete_unassigned: false };
        assert_eq!(strict.completable_from(), vec![JobStatus::Assigned]);
        assert!(!strict.may_complete_from(JobStatus::Open));
    }
}
