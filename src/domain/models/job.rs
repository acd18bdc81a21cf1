use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Assigned,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Assigned => "assigned",
            JobStatus::Completed => "completed",
        }
    }

    /// Forward-only ordering: open -> assigned -> completed.
    /// `open -> completed` is a policy decision made by the lifecycle engine.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Open, JobStatus::Assigned)
                | (JobStatus::Assigned, JobStatus::Completed)
                | (JobStatus::Open, JobStatus::Completed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(JobStatus::Open),
            "assigned" => Ok(JobStatus::Assigned),
            "completed" => Ok(JobStatus::Completed),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

pub const RECURRING_FREQUENCIES: [&str; 3] = ["weekly", "biweekly", "monthly"];
pub const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub service_type: String,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<String>,
    pub recurring_days: Option<Json<Vec<String>>>,
    pub recurring_end_date: Option<NaiveDate>,
}

impl Job {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Recurrence {
    pub frequency: String,
    #[serde(default)]
    pub days: Vec<String>,
    pub end_date: Option<NaiveDate>,
}

impl Recurrence {
    pub fn validate(&self, scheduled_date: Option<NaiveDate>) -> Result<(), String> {
        if !RECURRING_FREQUENCIES.contains(&self.frequency.as_str()) {
            return Err(format!("Unsupported recurring frequency '{}'", self.frequency));
        }
        if let Some(day) = self.days.iter().find(|d| !WEEKDAYS.contains(&d.as_str())) {
            return Err(format!("Unknown weekday '{}'", day));
        }
        if let (Some(end), Some(start)) = (self.end_date, scheduled_date)
            && end < start {
            return Err("Recurrence end date is before the scheduled date".into());
        }
        Ok(())
    }
}

/// Fields a hirer supplies when posting a job. Status and timestamps are
/// owned by the store.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub service_type: String,
    pub user_id: String,
    pub scheduled_date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".into());
        }
        if self.description.trim().is_empty() {
            return Err("description is required".into());
        }
        if self.location.trim().is_empty() {
            return Err("location is required".into());
        }
        validate_service_type(&self.service_type)?;
        if let Some(recurrence) = &self.recurrence {
            recurrence.validate(self.scheduled_date)?;
        }
        Ok(())
    }
}

/// Lowercase slug such as `lawn_care` or `moving`.
pub fn validate_service_type(service_type: &str) -> Result<(), String> {
    let valid = !service_type.is_empty()
        && service_type.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid service_type '{}'", service_type))
    }
}

/// Owner edits allowed while a job is open. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDetailsPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub service_type: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
}

impl JobDetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.city.is_none()
            && self.province.is_none()
            && self.postal_code.is_none()
            && self.service_type.is_none()
            && self.scheduled_date.is_none()
            && self.recurrence.is_none()
    }

    pub fn apply(self, job: &mut Job) -> Result<(), String> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err("title cannot be empty".into());
            }
            job.title = title;
        }
        if let Some(description) = self.description {
            if description.trim().is_empty() {
                return Err("description cannot be empty".into());
            }
            job.description = description;
        }
        if let Some(location) = self.location {
            if location.trim().is_empty() {
                return Err("location cannot be empty".into());
            }
            job.location = location;
        }
        if self.city.is_some() { job.city = self.city; }
        if self.province.is_some() { job.province = self.province; }
        if self.postal_code.is_some() { job.postal_code = self.postal_code; }
        if let Some(service_type) = self.service_type {
            validate_service_type(&service_type)?;
            job.service_type = service_type;
        }
        if self.scheduled_date.is_some() { job.scheduled_date = self.scheduled_date; }
        if let Some(recurrence) = self.recurrence {
            recurrence.validate(job.scheduled_date)?;
            job.is_recurring = true;
            job.recurring_frequency = Some(recurrence.frequency);
            job.recurring_days = Some(Json(recurrence.days));
            job.recurring_end_date = recurrence.end_date;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub user_id: Option<String>,
    pub service_type: Option<String>,
}

/// Job row plus its application count, as listed on the browse screens.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct JobSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: Job,
    pub application_count: i64,
}
