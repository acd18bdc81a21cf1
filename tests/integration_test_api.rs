mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

const OWNER: &str = "hirer-1";
const WORKER: &str = "worker-1";

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_auth_required_for_mutations() {
    let app = TestApp::new().await;

    let (status, body) = app.call("POST", "/api/jobs", None, Some(json!({
        "title": "t", "description": "d", "location": "l", "service_type": "cleaning"
    }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let response = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/notifications")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_token_is_accepted() {
    let app = TestApp::new().await;
    let token = app.token_for(OWNER);

    let response = app.router.clone().oneshot(
        Request::builder().method("GET").uri("/api/jobs/mine")
            .header(header::COOKIE, format!("access_token={}", token))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_job_validation() {
    let app = TestApp::new().await;

    let (status, body) = app.call("POST", "/api/jobs", Some(OWNER), Some(json!({
        "title": "  ", "description": "d", "location": "l", "service_type": "cleaning"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, _) = app.call("POST", "/api/jobs", Some(OWNER), Some(json!({
        "title": "t", "description": "d", "location": "l", "service_type": "Lawn Care"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("POST", "/api/jobs", Some(OWNER), Some(json!({
        "title": "t", "description": "d", "location": "l", "service_type": "cleaning",
        "recurrence": {"frequency": "daily", "days": []}
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, job) = app.call("POST", "/api/jobs", Some(OWNER), Some(json!({
        "title": "Biweekly clean", "description": "d", "location": "l", "service_type": "cleaning",
        "scheduled_date": "2030-01-01",
        "recurrence": {"frequency": "biweekly", "days": ["sat"], "end_date": "2030-06-01"}
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(job["status"], "open");
    assert_eq!(job["user_id"], OWNER);
    assert_eq!(job["is_recurring"], true);
    assert_eq!(job["recurring_days"], json!(["sat"]));
}

#[tokio::test]
async fn test_list_jobs_filters_and_counts() {
    let app = TestApp::new().await;
    let first = app.create_job(OWNER, "First").await;
    let second = app.create_job(OWNER, "Second").await;
    app.create_job("hirer-2", "Elsewhere").await;
    app.apply(first, WORKER).await;
    app.apply(first, "worker-2").await;
    app.state.lifecycle.mark_job_completed(second, OWNER).await.unwrap();

    let (status, jobs) = app.call("GET", "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 3);

    let (_, jobs) = app.call("GET", &format!("/api/jobs?user_id={}&status=open", OWNER), None, None).await;
    let jobs = jobs.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], first);
    assert_eq!(jobs[0]["application_count"], 2);

    let (_, jobs) = app.call("GET", "/api/jobs?service_type=plumbing", None, None).await;
    assert!(jobs.as_array().unwrap().is_empty());

    let (status, body) = app.call("GET", "/api/jobs?status=archived", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, body) = app.call("GET", &format!("/api/jobs/{}/applications/count", first), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (status, body) = app.call("GET", "/api/jobs/4242/applications/count", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "JOB_NOT_FOUND");
}

#[tokio::test]
async fn test_list_applications_by_worker_and_status() {
    let app = TestApp::new().await;
    let first = app.create_job(OWNER, "First").await;
    let second = app.create_job("hirer-2", "Second").await;
    let accepted = app.apply(first, WORKER).await;
    app.apply(second, WORKER).await;
    app.apply(second, "worker-2").await;
    app.set_application_status(OWNER, accepted, "accepted").await;

    let (_, rows) = app.call("GET", &format!("/api/applications?worker_id={}", WORKER), Some(WORKER), None).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let (_, rows) = app.call("GET", &format!("/api/applications?worker_id={}&status=accepted", WORKER), Some(WORKER), None).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["job_id"], first);
    assert_eq!(rows[0]["job_status"], "open");

    let (_, rows) = app.call("GET", "/api/applications?user_id=hirer-2", None, None).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_submit_application_validation() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Errands").await;

    let (status, body) = app.call("POST", "/api/applications", Some(WORKER), Some(json!({"job_id": job_id}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let (status, _) = app.call("POST", "/api/applications", Some(WORKER), Some(json!({
        "job_id": job_id, "applicant_id": "worker-9"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call("POST", "/api/applications", Some(WORKER), Some(json!({
        "job_id": 9999, "applicant_id": WORKER
    }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "JOB_NOT_FOUND");

    let (status, body) = app.call("PATCH", "/api/applications", Some(OWNER), Some(json!({"id": 1, "status": "rejected"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_notifications_flow() {
    let app = TestApp::new().await;

    let (status, body) = app.call("POST", "/api/notifications", Some(OWNER), Some(json!({
        "user_id": WORKER, "type": "broadcast", "title": "Hi"
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");

    let mut ids = Vec::new();
    for title in ["One", "Two"] {
        let (status, created) = app.call("POST", "/api/notifications", Some(OWNER), Some(json!({
            "user_id": WORKER, "type": "message", "title": title, "description": "New message", "job_id": 5
        }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["read"], false);
        assert_eq!(created["data"]["job_id"], 5);
        ids.push(created["id"].as_i64().unwrap());
    }

    // Someone else cannot mark the worker's notification.
    let (status, body) = app.call("PATCH", &format!("/api/notifications/{}/read", ids[0]), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOTIFICATION_NOT_FOUND");

    let (status, read) = app.call("PATCH", &format!("/api/notifications/{}/read", ids[0]), Some(WORKER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["read"], true);

    let (_, unread) = app.call("GET", "/api/notifications?unread=true", Some(WORKER), None).await;
    let unread = unread.as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["id"], ids[1]);

    let (status, body) = app.call("POST", "/api/notifications/read-all", Some(WORKER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, unread) = app.call("GET", "/api/notifications?unread=true", Some(WORKER), None).await;
    assert!(unread.as_array().unwrap().is_empty());
    let (_, all) = app.call("GET", "/api/notifications", Some(WORKER), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}
