use marketplace_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::auth::Claims,
    domain::models::notification::{NewNotification, Notification},
    domain::ports::NotificationRepository,
    infra::factory::{build_state, Repositories},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::{json, Value};

pub const TEST_SECRET: &str = "test-secret-do-not-use";
pub const TEST_AUDIENCE: &str = "authenticated";

/// Notification sink that is always down.
pub struct FailingNotificationRepo;

#[async_trait]
impl NotificationRepository for FailingNotificationRepo {
    async fn create(&self, _notification: &NewNotification) -> Result<Notification, AppError> {
        Err(AppError::UpstreamUnavailable("notifications offline".into()))
    }

    async fn list_for_user(&self, _user_id: &str, _unread_only: bool) -> Result<Vec<Notification>, AppError> {
        Err(AppError::UpstreamUnavailable("notifications offline".into()))
    }

    async fn mark_read(&self, _id: i64, _user_id: &str) -> Result<Option<Notification>, AppError> {
        Err(AppError::UpstreamUnavailable("notifications offline".into()))
    }

    async fn mark_all_read(&self, _user_id: &str) -> Result<u64, AppError> {
        Err(AppError::UpstreamUnavailable("notifications offline".into()))
    }
}

pub struct TestOptions {
    pub allow_complete_unassigned: bool,
    pub failing_notifications: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self { allow_complete_unassigned: true, failing_notifications: false }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            auth_jwt_secret: TEST_SECRET.to_string(),
            auth_audience: TEST_AUDIENCE.to_string(),
            request_timeout_secs: 10,
            read_retry_attempts: 0,
            allow_complete_unassigned: options.allow_complete_unassigned,
        };

        let mut repos = Repositories::sqlite(pool.clone());
        if options.failing_notifications {
            repos.notifications = Arc::new(FailingNotificationRepo);
        }

        let state = Arc::new(build_state(&config, repos));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub fn token_for(&self, user_id: &str) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
            iat: chrono::Utc::now().timestamp() as usize,
            email: Some(format!("{}@example.com", user_id)),
            role: Some("authenticated".to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap()
    }

    /// Sends a request as `user` (or anonymously) and returns status and JSON body.
    /// Non-JSON bodies come back as `Value::Null`.
    pub async fn call(&self, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token_for(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn create_job(&self, owner: &str, title: &str) -> i64 {
        let (status, body) = self.call("POST", "/api/jobs", Some(owner), Some(json!({
            "title": title,
            "description": "Weekly tidy of a two-bedroom flat",
            "location": "12 Queen St, Toronto",
            "city": "Toronto",
            "province": "ON",
            "service_type": "cleaning",
            "scheduled_date": "2030-05-01"
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "create job failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn apply(&self, job_id: i64, worker: &str) -> i64 {
        let (status, body) = self.call("POST", "/api/applications", Some(worker), Some(json!({
            "job_id": job_id,
            "applicant_id": worker,
            "message": "I can do this"
        }))).await;
        assert_eq!(status, StatusCode::CREATED, "apply failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn set_application_status(&self, owner: &str, application_id: i64, status: &str) -> (StatusCode, Value) {
        self.call("PATCH", "/api/applications", Some(owner), Some(json!({
            "id": application_id,
            "status": status
        }))).await
    }

    pub async fn hire(&self, owner: &str, application_id: i64, scheduled_date: &str) -> (StatusCode, Value) {
        self.call("PATCH", "/api/applications", Some(owner), Some(json!({
            "id": application_id,
            "status": "hired",
            "scheduled_date": scheduled_date
        }))).await
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
