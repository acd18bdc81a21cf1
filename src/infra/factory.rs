use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    JobRepository, ApplicationRepository, NotificationRepository,
    ConversationRepository, ApplicationViewRepository,
};
use crate::domain::services::lifecycle::{LifecycleEngine, LifecyclePolicy};
use crate::domain::services::listings::ListingService;
use crate::domain::services::retry::RetryPolicy;
use crate::domain::services::view_state::ViewStateTracker;
use crate::infra::repositories::{
    postgres_job_repo::PostgresJobRepo, postgres_application_repo::PostgresApplicationRepo,
    postgres_notification_repo::PostgresNotificationRepo, postgres_conversation_repo::PostgresConversationRepo,
    postgres_application_view_repo::PostgresApplicationViewRepo,
    sqlite_job_repo::SqliteJobRepo, sqlite_application_repo::SqliteApplicationRepo,
    sqlite_notification_repo::SqliteNotificationRepo, sqlite_conversation_repo::SqliteConversationRepo,
    sqlite_application_view_repo::SqliteApplicationViewRepo,
};

/// The stores behind the services, selected per database backend.
pub struct Repositories {
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub views: Arc<dyn ApplicationViewRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            jobs: Arc::new(PostgresJobRepo::new(pool.clone())),
            applications: Arc::new(PostgresApplicationRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            conversations: Arc::new(PostgresConversationRepo::new(pool.clone())),
            views: Arc::new(PostgresApplicationViewRepo::new(pool)),
        }
    }

    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            jobs: Arc::new(SqliteJobRepo::new(pool.clone())),
            applications: Arc::new(SqliteApplicationRepo::new(pool.clone())),
            notifications: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            conversations: Arc::new(SqliteConversationRepo::new(pool.clone())),
            views: Arc::new(SqliteApplicationViewRepo::new(pool)),
        }
    }
}

/// Wires the services on top of a set of repositories.
pub fn build_state(config: &Config, repos: Repositories) -> AppState {
    let policy = LifecyclePolicy { allow_complete_unassigned: config.allow_complete_unassigned };
    let retry = RetryPolicy { attempts: config.read_retry_attempts, ..RetryPolicy::default() };

    let lifecycle = Arc::new(LifecycleEngine::new(
        repos.jobs.clone(),
        repos.applications.clone(),
        repos.notifications.clone(),
        repos.conversations.clone(),
        policy,
    ));
    let view_state = Arc::new(ViewStateTracker::new(
        repos.views.clone(),
        repos.applications.clone(),
        repos.jobs.clone(),
    ));
    let listings = Arc::new(ListingService::new(
        repos.jobs.clone(),
        repos.applications.clone(),
        repos.views.clone(),
        retry,
    ));

    AppState {
        config: config.clone(),
        job_repo: repos.jobs,
        application_repo: repos.applications,
        notification_repo: repos.notifications,
        conversation_repo: repos.conversations,
        view_repo: repos.views,
        lifecycle,
        view_state,
        listings,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        Repositories::postgres(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        Repositories::sqlite(pool)
    };

    build_state(config, repos)
}

pub async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
