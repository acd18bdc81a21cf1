use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use super::job::JobStatus;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Declined,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// States an application may be in for `self` to be entered.
    pub fn allowed_from(&self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Pending => &[ApplicationStatus::Declined],
            ApplicationStatus::Accepted => &[ApplicationStatus::Pending],
            ApplicationStatus::Declined => &[ApplicationStatus::Pending, ApplicationStatus::Accepted],
            ApplicationStatus::Hired => &[ApplicationStatus::Accepted],
        }
    }

    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        next.allowed_from().contains(self)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "declined" => Ok(ApplicationStatus::Declined),
            "hired" => Ok(ApplicationStatus::Hired),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub applicant_id: String,
    pub message: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub applicant_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub job_id: Option<i64>,
    /// Owner of the job the applications were sent to.
    pub poster_id: Option<String>,
    pub worker_id: Option<String>,
    pub status: Option<ApplicationStatus>,
}

/// Application denormalized with the job it targets.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct ApplicationView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    #[sqlx(try_from = "String")]
    pub job_status: JobStatus,
    pub job_location: String,
    pub job_service_type: String,
    pub job_scheduled_date: Option<NaiveDate>,
    pub poster_id: String,
    #[sqlx(skip)]
    pub viewed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
        assert!(Accepted.can_transition_to(Hired));
        assert!(Accepted.can_transition_to(Declined));
        assert!(Declined.can_transition_to(Pending));

        assert!(!Pending.can_transition_to(Hired));
        assert!(!Declined.can_transition_to(Hired));
        assert!(!Declined.can_transition_to(Accepted));
        for next in [Pending, Accepted, Declined, Hired] {
            assert!(!Hired.can_transition_to(next), "hired must be terminal, got {}", next);
        }
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [Pending, Accepted, Declined, Hired] {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!(ApplicationStatus::try_from("withdrawn".to_string()).is_err());
    }
}
