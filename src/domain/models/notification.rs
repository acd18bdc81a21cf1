use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

pub const TYPE_APPLICATION: &str = "application";
pub const TYPE_JOB: &str = "job";
pub const TYPE_MESSAGE: &str = "message";

pub const NOTIFICATION_TYPES: [&str; 3] = [TYPE_APPLICATION, TYPE_JOB, TYPE_MESSAGE];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NotificationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub data: Json<NotificationData>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub description: String,
    pub data: NotificationData,
}

impl NewNotification {
    pub fn new_application(owner_id: &str, job_id: i64, application_id: i64, job_title: &str) -> Self {
        Self {
            user_id: owner_id.to_string(),
            kind: TYPE_APPLICATION.to_string(),
            title: "New application".to_string(),
            description: format!("Someone applied to your job \"{}\".", job_title),
            data: NotificationData { job_id: Some(job_id), application_id: Some(application_id) },
        }
    }

    pub fn application_accepted(applicant_id: &str, job_id: i64, application_id: i64, job_title: &str) -> Self {
        Self {
            user_id: applicant_id.to_string(),
            kind: TYPE_APPLICATION.to_string(),
            title: "Application accepted".to_string(),
            description: format!("Your application for \"{}\" was accepted.", job_title),
            data: NotificationData { job_id: Some(job_id), application_id: Some(application_id) },
        }
    }

    pub fn application_declined(applicant_id: &str, job_id: i64, application_id: i64, job_title: &str) -> Self {
        Self {
            user_id: applicant_id.to_string(),
            kind: TYPE_APPLICATION.to_string(),
            title: "Application update".to_string(),
            description: format!("Your application for \"{}\" was not selected.", job_title),
            data: NotificationData { job_id: Some(job_id), application_id: Some(application_id) },
        }
    }

    pub fn hired(applicant_id: &str, job_id: i64, application_id: i64, job_title: &str) -> Self {
        Self {
            user_id: applicant_id.to_string(),
            kind: TYPE_JOB.to_string(),
            title: "You've been hired!".to_string(),
            description: format!("You've been hired for \"{}\".", job_title),
            data: NotificationData { job_id: Some(job_id), application_id: Some(application_id) },
        }
    }

    pub fn job_completed(worker_id: &str, job_id: i64, application_id: i64, job_title: &str) -> Self {
        Self {
            user_id: worker_id.to_string(),
            kind: TYPE_JOB.to_string(),
            title: "Job completed".to_string(),
            description: format!("\"{}\" was marked as completed.", job_title),
            data: NotificationData { job_id: Some(job_id), application_id: Some(application_id) },
        }
    }
}
