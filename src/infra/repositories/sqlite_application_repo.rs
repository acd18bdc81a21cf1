use crate::domain::{
    models::{
        application::{Application, ApplicationFilter, ApplicationStatus, ApplicationView, NewApplication},
        job::{Job, JobStatus},
    },
    ports::ApplicationRepository,
};
use crate::error::AppError;
use super::map_application_insert_error;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use chrono::{NaiveDate, Utc};

const VIEW_SELECT: &str = "SELECT a.id, a.job_id, a.applicant_id, a.message, a.status, a.created_at, a.updated_at,
    j.title AS job_title, j.status AS job_status, j.location AS job_location, j.service_type AS job_service_type,
    j.scheduled_date AS job_scheduled_date, j.user_id AS poster_id
    FROM job_applications a JOIN jobs j ON j.id = a.job_id WHERE 1 = 1";

pub struct SqliteApplicationRepo {
    pool: SqlitePool,
}

impl SqliteApplicationRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepo {
    async fn create(&self, application: &NewApplication) -> Result<Application, AppError> {
        sqlx::query_as::<_, Application>(
            "INSERT INTO job_applications (job_id, applicant_id, message, status, created_at) VALUES (?, ?, ?, 'pending', ?) RETURNING *"
        )
            .bind(application.job_id)
            .bind(&application.applicant_id)
            .bind(&application.message)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(map_application_insert_error)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, Application>("SELECT * FROM job_applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_job_and_applicant(&self, job_id: i64, applicant_id: &str) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, Application>("SELECT * FROM job_applications WHERE job_id = ? AND applicant_id = ?")
            .bind(job_id)
            .bind(applicant_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_job(&self, job_id: i64) -> Result<Vec<Application>, AppError> {
        sqlx::query_as::<_, Application>("SELECT * FROM job_applications WHERE job_id = ? ORDER BY created_at DESC, id DESC")
            .bind(job_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_views(&self, filter: &ApplicationFilter) -> Result<Vec<ApplicationView>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(VIEW_SELECT);
        if let Some(job_id) = filter.job_id {
            qb.push(" AND a.job_id = ").push_bind(job_id);
        }
        if let Some(poster_id) = &filter.poster_id {
            qb.push(" AND j.user_id = ").push_bind(poster_id.clone());
        }
        if let Some(worker_id) = &filter.worker_id {
            qb.push(" AND a.applicant_id = ").push_bind(worker_id.clone());
        }
        if let Some(status) = filter.status {
            qb.push(" AND a.status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY a.created_at DESC, a.id DESC");

        qb.build_query_as::<ApplicationView>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_job(&self, job_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_applications WHERE job_id = ?")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_hired_for_job(&self, job_id: i64) -> Result<Option<Application>, AppError> {
        sqlx::query_as::<_, Application>("SELECT * FROM job_applications WHERE job_id = ? AND status = 'hired' LIMIT 1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn transition(&self, id: i64, to: ApplicationStatus) -> Result<Option<Application>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE job_applications SET status = ");
        qb.push_bind(to.as_str());
        qb.push(", updated_at = ").push_bind(Utc::now());
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND status IN (");
        let mut statuses = qb.separated(", ");
        for status in to.allowed_from() {
            statuses.push_bind(status.as_str());
        }
        statuses.push_unseparated(") RETURNING *");

        qb.build_query_as::<Application>()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn hire(&self, job_id: i64, application_id: i64, scheduled_date: NaiveDate) -> Result<(Job, Application), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Conditional write first: it takes the write lock and settles the race.
        let assigned = sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'assigned', scheduled_date = ? WHERE id = ? AND status = 'open' RETURNING *"
        )
            .bind(scheduled_date)
            .bind(job_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let job = match assigned {
            Some(job) => job,
            None => {
                let current = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
                    .bind(job_id)
                    .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
                return Err(match current {
                    None => AppError::JobNotFound(job_id),
                    Some(job) if job.status == JobStatus::Assigned => AppError::JobAlreadyAssigned(job_id),
                    Some(job) => AppError::invalid_job_transition(job.status, JobStatus::Assigned),
                });
            }
        };

        let application = sqlx::query_as::<_, Application>("SELECT * FROM job_applications WHERE id = ?")
            .bind(application_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or(AppError::ApplicationNotFound(application_id))?;
        if application.job_id != job_id {
            return Err(AppError::Validation(format!("Application {} does not belong to job {}", application_id, job_id)));
        }

        let other_hired = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM job_applications WHERE job_id = ? AND status = 'hired' AND id != ?"
        )
            .bind(job_id)
            .bind(application_id)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        if other_hired > 0 {
            return Err(AppError::JobAlreadyAssigned(job_id));
        }

        let hired = sqlx::query_as::<_, Application>(
            "UPDATE job_applications SET status = 'hired', updated_at = ? WHERE id = ? AND status = 'accepted' RETURNING *"
        )
            .bind(Utc::now())
            .bind(application_id)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::invalid_application_transition(application.status, ApplicationStatus::Hired))?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok((job, hired))
    }
}
