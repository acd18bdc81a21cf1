use crate::domain::{models::job::{Job, JobFilter, JobStatus, JobSummary, NewJob}, ports::JobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sqlx::types::Json;
use chrono::{DateTime, Utc};

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl JobRepository for SqliteJobRepo {
    async fn create(&self, job: &NewJob) -> Result<Job, AppError> {
        let recurrence = job.recurrence.as_ref();
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (title, description, location, city, province, postal_code, service_type, status, user_id, created_at, scheduled_date, is_recurring, recurring_frequency, recurring_days, recurring_end_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'open', ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.location)
            .bind(&job.city)
            .bind(&job.province)
            .bind(&job.postal_code)
            .bind(&job.service_type)
            .bind(&job.user_id)
            .bind(Utc::now())
            .bind(job.scheduled_date)
            .bind(recurrence.is_some())
            .bind(recurrence.map(|r| r.frequency.clone()))
            .bind(recurrence.map(|r| Json(r.days.clone())))
            .bind(recurrence.and_then(|r| r.end_date))
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobSummary>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT j.*, (SELECT COUNT(*) FROM job_applications a WHERE a.job_id = j.id) AS application_count FROM jobs j WHERE 1 = 1"
        );
        if let Some(status) = filter.status {
            qb.push(" AND j.status = ").push_bind(status.as_str());
        }
        if let Some(user_id) = &filter.user_id {
            qb.push(" AND j.user_id = ").push_bind(user_id.clone());
        }
        if let Some(service_type) = &filter.service_type {
            qb.push(" AND j.service_type = ").push_bind(service_type.clone());
        }
        qb.push(" ORDER BY j.created_at DESC, j.id DESC");

        qb.build_query_as::<JobSummary>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_details(&self, job: &Job) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET title = ?, description = ?, location = ?, city = ?, province = ?, postal_code = ?, service_type = ?,
                scheduled_date = ?, is_recurring = ?, recurring_frequency = ?, recurring_days = ?, recurring_end_date = ?
             WHERE id = ? AND status = 'open'
             RETURNING *"
        )
            .bind(&job.title)
            .bind(&job.description)
            .bind(&job.location)
            .bind(&job.city)
            .bind(&job.province)
            .bind(&job.postal_code)
            .bind(&job.service_type)
            .bind(job.scheduled_date)
            .bind(job.is_recurring)
            .bind(&job.recurring_frequency)
            .bind(&job.recurring_days)
            .bind(job.recurring_end_date)
            .bind(job.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn complete(&self, id: i64, allowed_from: &[JobStatus], completed_at: DateTime<Utc>) -> Result<Option<Job>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE jobs SET status = 'completed', completed_at = ");
        qb.push_bind(completed_at);
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND status IN (");
        let mut statuses = qb.separated(", ");
        for status in allowed_from {
            statuses.push_bind(status.as_str());
        }
        statuses.push_unseparated(") RETURNING *");

        qb.build_query_as::<Job>()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn delete_open(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // No-op write takes the database write lock before anything is read.
        let is_open = sqlx::query("UPDATE jobs SET status = 'open' WHERE id = ? AND status = 'open'")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?
            .rows_affected() == 1;
        if !is_open {
            return Ok(false);
        }

        sqlx::query("DELETE FROM application_views WHERE application_id IN (SELECT id FROM job_applications WHERE job_id = ?)")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM job_applications WHERE job_id = ?")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(true)
    }
}
