use crate::domain::{models::notification::{NewNotification, Notification}, ports::NotificationRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::types::Json;
use chrono::Utc;

pub struct SqliteNotificationRepo {
    pool: SqlitePool,
}

impl SqliteNotificationRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepo {
    async fn create(&self, notification: &NewNotification) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, type, title, description, data, read, created_at) VALUES (?, ?, ?, ?, ?, 0, ?) RETURNING *"
        )
            .bind(&notification.user_id)
            .bind(&notification.kind)
            .bind(&notification.title)
            .bind(&notification.description)
            .bind(Json(&notification.data))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str, unread_only: bool) -> Result<Vec<Notification>, AppError> {
        let query = if unread_only {
            "SELECT * FROM notifications WHERE user_id = ? AND read = 0 ORDER BY created_at DESC, id DESC LIMIT 100"
        } else {
            "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT 100"
        };
        sqlx::query_as::<_, Notification>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_read(&self, id: i64, user_id: &str) -> Result<Option<Notification>, AppError> {
        sqlx::query_as::<_, Notification>("UPDATE notifications SET read = 1 WHERE id = ? AND user_id = ? RETURNING *")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}
