use crate::domain::ports::ApplicationViewRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use chrono::Utc;

pub struct PostgresApplicationViewRepo {
    pool: PgPool,
}

impl PostgresApplicationViewRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl ApplicationViewRepository for PostgresApplicationViewRepo {
    async fn mark_viewed(&self, user_id: &str, application_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO application_views (user_id, application_id, viewed_at) VALUES ($1, $2, $3)
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
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM application_views WHERE user_id = $1 AND application_id = $2)"
        )
            .bind(user_id)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn viewed_ids(&self, user_id: &str, job_id: Option<i64>) -> Result<Vec<i64>, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT v.application_id FROM application_views v
             JOIN job_applications a ON a.id = v.application_id
             WHERE v.user_id = $1 AND ($2::BIGINT IS NULL OR a.job_id = $2)"
        )
            .bind(user_id)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
