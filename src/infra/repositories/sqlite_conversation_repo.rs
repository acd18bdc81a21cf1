use crate::domain::{models::conversation::{Conversation, Message}, ports::ConversationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::Utc;

pub struct SqliteConversationRepo {
    pool: SqlitePool,
}

impl SqliteConversationRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ConversationRepository for SqliteConversationRepo {
    async fn find_or_create(&self, job_id: i64, hirer_id: &str, worker_id: &str) -> Result<Conversation, AppError> {
        let now = Utc::now();
        sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (job_id, hirer_id, worker_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (job_id, hirer_id, worker_id) DO UPDATE SET updated_at = excluded.updated_at
             RETURNING *"
        )
            .bind(job_id)
            .bind(hirer_id)
            .bind(worker_id)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn send_message(&self, conversation_id: i64, sender_id: &str, content: &str) -> Result<Message, AppError> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, content, created_at) VALUES (?, ?, ?, ?) RETURNING *"
        )
            .bind(conversation_id)
            .bind(sender_id)
            .bind(content)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_messages(&self, conversation_id: i64) -> Result<Vec<Message>, AppError> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC, id ASC")
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
