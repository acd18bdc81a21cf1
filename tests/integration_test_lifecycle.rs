mod common;

use axum::http::StatusCode;
use common::{TestApp, TestOptions};
use marketplace_backend::domain::models::application::ApplicationStatus;
use marketplace_backend::domain::models::job::JobStatus;
use marketplace_backend::error::AppError;
use serde_json::json;

const OWNER: &str = "hirer-1";
const WORKER: &str = "worker-1";
const OTHER_WORKER: &str = "worker-2";

#[tokio::test]
async fn test_scenario_a_apply_notifies_owner() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Deep clean").await;

    let (status, body) = app.call("POST", "/api/applications", Some(WORKER), Some(json!({
        "job_id": job_id,
        "applicant_id": WORKER,
        "message": "Available all week"
    }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["job_id"], job_id);

    let (status, notifications) = app.call("GET", "/api/notifications", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "application");
    assert_eq!(notifications[0]["data"]["job_id"], job_id);
    assert_eq!(notifications[0]["data"]["application_id"], body["id"]);
    assert_eq!(notifications[0]["read"], false);

    // Applying also opens a conversation carrying the applicant's message.
    let conversation = app.state.conversation_repo.find_or_create(job_id, OWNER, WORKER).await.unwrap();
    let messages = app.state.conversation_repo.list_messages(conversation.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender_id, WORKER);
    assert_eq!(messages[0].content, "Available all week");
}

#[tokio::test]
async fn test_scenario_b_accept_then_hire() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Lawn mowing").await;
    let application_id = app.apply(job_id, WORKER).await;

    let (status, accepted) = app.set_application_status(OWNER, application_id, "accepted").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    let (status, hired) = app.hire(OWNER, application_id, "2024-01-15").await;
    assert_eq!(status, StatusCode::OK, "hire failed: {}", hired);
    assert_eq!(hired["application"]["status"], "hired");
    assert_eq!(hired["job"]["status"], "assigned");
    assert_eq!(hired["job"]["scheduled_date"], "2024-01-15");

    let (_, job) = app.call("GET", &format!("/api/jobs/{}", job_id), None, None).await;
    assert_eq!(job["status"], "assigned");
    assert_eq!(job["scheduled_date"], "2024-01-15");

    let (_, notifications) = app.call("GET", "/api/notifications", Some(WORKER), None).await;
    let notifications = notifications.as_array().unwrap();
    let hired_notice = notifications.iter()
        .find(|n| n["type"] == "job")
        .expect("hired notification missing");
    assert_eq!(hired_notice["title"], "You've been hired!");
    assert!(notifications.iter().any(|n| n["type"] == "application"), "accept notification missing");
}

#[tokio::test]
async fn test_scenario_c_complete_is_final() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Gutter cleaning").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    app.hire(OWNER, application_id, "2030-06-01").await;

    let (status, job) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(OWNER), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "completed");
    assert!(!job["completed_at"].is_null());

    let (status, body) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(OWNER), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, _) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(OWNER), Some(json!({"status": "open"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, notifications) = app.call("GET", "/api/notifications", Some(WORKER), None).await;
    assert!(notifications.as_array().unwrap().iter().any(|n| n["title"] == "Job completed"));
}

#[tokio::test]
async fn test_scenario_d_duplicate_application_rejected() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Window washing").await;
    app.apply(job_id, WORKER).await;

    let (status, body) = app.call("POST", "/api/applications", Some(WORKER), Some(json!({
        "job_id": job_id,
        "applicant_id": WORKER
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE_APPLICATION");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_applications WHERE job_id = ? AND applicant_id = ?")
        .bind(job_id)
        .bind(WORKER)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_second_hire_fails_with_job_already_assigned() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Snow removal").await;
    let first = app.apply(job_id, WORKER).await;
    let second = app.apply(job_id, OTHER_WORKER).await;
    app.set_application_status(OWNER, first, "accepted").await;
    app.set_application_status(OWNER, second, "accepted").await;

    let (status, _) = app.hire(OWNER, first, "2030-01-10").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.hire(OWNER, second, "2030-01-11").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "JOB_ALREADY_ASSIGNED");

    let second_app = app.state.application_repo.find_by_id(second).await.unwrap().unwrap();
    assert_eq!(second_app.status, ApplicationStatus::Accepted);
    let job = app.state.job_repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.scheduled_date.unwrap().to_string(), "2030-01-10");
}

#[tokio::test]
async fn test_repository_hire_rejects_second_hire_without_prechecks() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Fence painting").await;
    let first = app.apply(job_id, WORKER).await;
    let second = app.apply(job_id, OTHER_WORKER).await;
    app.set_application_status(OWNER, first, "accepted").await;
    app.set_application_status(OWNER, second, "accepted").await;

    let date = chrono::NaiveDate::from_ymd_opt(2030, 2, 1).unwrap();
    app.state.application_repo.hire(job_id, first, date).await.unwrap();

    let err = app.state.application_repo.hire(job_id, second, date).await.unwrap_err();
    assert!(matches!(err, AppError::JobAlreadyAssigned(id) if id == job_id));
}

#[tokio::test]
async fn test_hiring_pending_application_is_invalid_transition() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Dog walking").await;
    let application_id = app.apply(job_id, WORKER).await;

    let (status, body) = app.hire(OWNER, application_id, "2030-03-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let job = app.state.job_repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open);
}

#[tokio::test]
async fn test_hire_requires_scheduled_date() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Furniture assembly").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;

    let (status, body) = app.set_application_status(OWNER, application_id, "hired").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn test_apply_to_non_open_job_fails() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Pressure washing").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    app.hire(OWNER, application_id, "2030-04-01").await;

    let err = app.state.lifecycle.submit_application(job_id, OTHER_WORKER, None).await.unwrap_err();
    assert!(matches!(err, AppError::JobNotOpen(id) if id == job_id));

    let (status, body) = app.call("POST", "/api/applications", Some(OTHER_WORKER), Some(json!({
        "job_id": job_id,
        "applicant_id": OTHER_WORKER
    }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "JOB_NOT_OPEN");
}

#[tokio::test]
async fn test_owner_cannot_apply_to_own_job() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Moving help").await;

    let err = app.state.lifecycle.submit_application(job_id, OWNER, None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_non_owner_cannot_accept() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Tile repair").await;
    let application_id = app.apply(job_id, WORKER).await;

    let (status, body) = app.set_application_status(OTHER_WORKER, application_id, "accepted").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    let application = app.state.application_repo.find_by_id(application_id).await.unwrap().unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn test_decline_and_reconsider() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Plumbing").await;
    let application_id = app.apply(job_id, WORKER).await;

    let (status, declined) = app.set_application_status(OWNER, application_id, "declined").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(declined["status"], "declined");

    let (_, notifications) = app.call("GET", "/api/notifications", Some(WORKER), None).await;
    assert!(notifications.as_array().unwrap().iter().any(|n| n["title"] == "Application update"));

    // Declined applications cannot be accepted directly.
    let (status, body) = app.set_application_status(OWNER, application_id, "accepted").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let (status, pending) = app.set_application_status(OWNER, application_id, "pending").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending["status"], "pending");

    let (status, accepted) = app.set_application_status(OWNER, application_id, "accepted").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");
}

#[tokio::test]
async fn test_hired_is_terminal() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Roof inspection").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    app.hire(OWNER, application_id, "2030-07-01").await;

    for target in ["pending", "accepted", "declined"] {
        let (status, body) = app.set_application_status(OWNER, application_id, target).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "hired -> {} should fail", target);
        assert_eq!(body["code"], "INVALID_TRANSITION", "hired -> {}", target);
    }
}

#[tokio::test]
async fn test_hiring_pending_application_on_assigned_job_is_invalid_transition() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Attic insulation").await;
    let hired = app.apply(job_id, WORKER).await;
    let pending = app.apply(job_id, OTHER_WORKER).await;
    app.set_application_status(OWNER, hired, "accepted").await;
    let (status, _) = app.hire(OWNER, hired, "2030-07-02").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.hire(OWNER, pending, "2030-07-03").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let application = app.state.application_repo.find_by_id(pending).await.unwrap().unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
}

#[tokio::test]
async fn test_rehiring_hired_application_is_invalid_transition() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Chimney sweep").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    let (status, _) = app.hire(OWNER, application_id, "2030-07-04").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.hire(OWNER, application_id, "2030-07-05").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    let job = app.state.job_repo.find_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.scheduled_date.unwrap().to_string(), "2030-07-04");
}

#[tokio::test]
async fn test_reconsider_on_closed_job_is_job_not_open() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Driveway sealing").await;
    let declined = app.apply(job_id, WORKER).await;
    let hired = app.apply(job_id, OTHER_WORKER).await;
    app.set_application_status(OWNER, declined, "declined").await;
    app.set_application_status(OWNER, hired, "accepted").await;
    app.hire(OWNER, hired, "2030-07-06").await;

    let (status, body) = app.set_application_status(OWNER, declined, "pending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "JOB_NOT_OPEN");
}

#[tokio::test]
async fn test_permissive_policy_completes_open_job() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Garage cleanup").await;

    let job = app.state.lifecycle.mark_job_completed(job_id, OWNER).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());
}

#[tokio::test]
async fn test_strict_policy_rejects_completing_open_job() {
    let app = TestApp::with_options(TestOptions { allow_complete_unassigned: false, ..Default::default() }).await;
    let job_id = app.create_job(OWNER, "Basement cleanup").await;

    let err = app.state.lifecycle.mark_job_completed(job_id, OWNER).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { entity: "job", .. }));

    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    app.hire(OWNER, application_id, "2030-08-01").await;

    let job = app.state.lifecycle.mark_job_completed(job_id, OWNER).await.unwrap();
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_only_owner_completes_job() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Car detailing").await;

    let (status, body) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(WORKER), Some(json!({"status": "completed"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");
}

#[tokio::test]
async fn test_delete_open_job_cascades() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Painting").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.call("POST", &format!("/api/applications/{}/view", application_id), Some(OWNER), None).await;

    let (status, body) = app.call("DELETE", &format!("/api/jobs/{}", job_id), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (status, _) = app.call("GET", &format!("/api/jobs/{}", job_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.state.application_repo.find_by_id(application_id).await.unwrap().is_none());
    let views: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM application_views WHERE application_id = ?")
        .bind(application_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(views, 0);

    // The owner's "new application" notification is kept.
    let (_, notifications) = app.call("GET", "/api/notifications", Some(OWNER), None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_assigned_job_fails() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Carpet cleaning").await;
    let application_id = app.apply(job_id, WORKER).await;
    app.set_application_status(OWNER, application_id, "accepted").await;
    app.hire(OWNER, application_id, "2030-09-01").await;

    let (status, body) = app.call("DELETE", &format!("/api/jobs/{}", job_id), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert!(app.state.application_repo.find_by_id(application_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_lifecycle() {
    let app = TestApp::with_options(TestOptions { failing_notifications: true, ..Default::default() }).await;
    let job_id = app.create_job(OWNER, "Hedge trimming").await;
    let application_id = app.apply(job_id, WORKER).await;

    let (status, _) = app.set_application_status(OWNER, application_id, "accepted").await;
    assert_eq!(status, StatusCode::OK);
    let (status, hired) = app.hire(OWNER, application_id, "2030-10-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hired["application"]["status"], "hired");
}

#[tokio::test]
async fn test_edit_job_details_only_while_open() {
    let app = TestApp::new().await;
    let job_id = app.create_job(OWNER, "Kitchen clean").await;

    let (status, job) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(OWNER), Some(json!({
        "title": "Kitchen and bathroom clean",
        "recurrence": {"frequency": "weekly", "days": ["mon", "thu"]}
    }))).await;
    assert_eq!(status, StatusCode::OK, "edit failed: {}", job);
    assert_eq!(job["title"], "Kitchen and bathroom clean");
    assert_eq!(job["status"], "open");
    assert_eq!(job["is_recurring"], true);

    let (status, body) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(WORKER), Some(json!({"title": "Hijacked"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_OWNER");

    app.state.lifecycle.mark_job_completed(job_id, OWNER).await.unwrap();
    let (status, body) = app.call("PATCH", &format!("/api/jobs/{}", job_id), Some(OWNER), Some(json!({"title": "Too late"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}
