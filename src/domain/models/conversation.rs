use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Conversation {
    pub id: i64,
    pub job_id: i64,
    pub hirer_id: String,
    pub worker_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub fn default_application_message(job_title: &str) -> String {
    format!("Hi! I just applied to your job \"{}\".", job_title)
}
