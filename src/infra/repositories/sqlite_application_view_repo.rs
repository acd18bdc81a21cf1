use crate::domain::ports::ApplicationViewRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::Utc;

pub struct SqliteApplicationViewRepo {
    pool: SqlitePool,
}

impl SqliteApplicationViewRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ApplicationViewRepository for SqliteApplicationViewRepo {
    async fn mark_viewed(&self, user_id: &str, application_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO application_views (user_id, application_id, viewed_at) VALUES (?, ?, ?)
             ON CONFLICT (user_id, application_id) DO NOTHING"
        )
            .bind(user_id)
            .bind(application_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn is_viewed(&self, user_id: &str, application_id: i64) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM application_views WHERE user_id = ? AND application_id = ?"
        )
            .bind(user_id)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn viewed_ids(&self, user_id: &str, job_id: Option<i64>) -> Result<Vec<i64>, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT v.application_id FROM application_views v
             JOIN job_applications a ON a.id = v.application_id
             WHERE v.user_id = ? AND (? IS NULL OR a.job_id = ?)"
        )
            .bind(user_id)
            .bind(job_id)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
