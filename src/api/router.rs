use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    routing::{get, post, patch},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, job, application, view_state, notification};
use tower_http::{
    trace::TraceLayer,
    timeout::TimeoutLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn request_timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health_check))

        // Jobs
        .route("/api/jobs", get(job::list_jobs).post(job::create_job))
        .route("/api/jobs/mine", get(job::my_jobs))
        .route("/api/jobs/{id}", get(job::get_job).patch(job::update_job).delete(job::delete_job))
        .route("/api/jobs/{id}/applications/count", get(job::count_applications))
        .route("/api/jobs/{id}/new-count", get(view_state::new_count))

        // Applications
        .route("/api/applications", get(application::list_applications)
            .post(application::submit_application)
            .patch(application::update_application))
        .route("/api/applications/viewed", get(view_state::viewed_set))
        .route("/api/applications/{id}/view", post(view_state::mark_viewed).get(view_state::is_viewed))

        // Notifications
        .route("/api/notifications", get(notification::list_notifications).post(notification::create_notification))
        .route("/api/notifications/read-all", post(notification::mark_all_read))
        .route("/api/notifications/{id}/read", patch(notification::mark_read))

        .layer(request_timeout_layer(request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let app: Router = Router::new()
            .route("/slow", get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "done"
            }))
            .layer(request_timeout_layer(Duration::from_millis(10)));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
