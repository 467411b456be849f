use crate::helpers::{make_test_app, seed, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn teacher_creates_class_student_cannot() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let body = json!({ "name": "Operating Systems", "semester": "5", "schedule": "Tue 09:00" });

    let (status, json) = send(
        &app,
        "POST",
        "/api/classrooms",
        Some(&s.teacher_token),
        Some(body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "Operating Systems");
    assert_eq!(json["data"]["teacher_id"], s.teacher.id);
    assert_eq!(json["data"]["attendance_threshold"], 75);

    let (status, _) = send(&app, "POST", "/api/classrooms", Some(&s.student_token), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_is_scoped_to_the_caller() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;

    let (_, teacher_view) = send(&app, "GET", "/api/classrooms", Some(&s.teacher_token), None).await;
    let (_, student_view) = send(&app, "GET", "/api/classrooms", Some(&s.student_token), None).await;
    let (_, outsider_view) = send(&app, "GET", "/api/classrooms", Some(&s.outsider_token), None).await;

    assert_eq!(teacher_view["data"].as_array().unwrap().len(), 1);
    assert_eq!(student_view["data"].as_array().unwrap().len(), 1);
    assert!(outsider_view["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn join_is_idempotent_and_grants_access() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let uri = format!("/api/classrooms/{}", s.classroom.id);

    let (status, _) = send(&app, "GET", &uri, Some(&s.outsider_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let join = format!("{uri}/join");
    let (first, _) = send(&app, "POST", &join, Some(&s.outsider_token), None).await;
    let (second, _) = send(&app, "POST", &join, Some(&s.outsider_token), None).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);

    let (status, json) = send(&app, "GET", &uri, Some(&s.outsider_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["student_count"], 2);
}

#[tokio::test]
async fn teacher_cannot_join() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let join = format!("/api/classrooms/{}/join", s.classroom.id);

    let (status, _) = send(&app, "POST", &join, Some(&s.teacher_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn owner_updates_threshold_and_next_class() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let uri = format!("/api/classrooms/{}", s.classroom.id);
    let soon = (chrono::Utc::now() + chrono::Duration::minutes(30)).to_rfc3339();

    let (status, json) = send(
        &app,
        "PUT",
        &uri,
        Some(&s.teacher_token),
        Some(json!({ "attendance_threshold": 80, "next_class_time": soon })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["attendance_threshold"], 80);

    let (_, view) = send(&app, "GET", &uri, Some(&s.student_token), None).await;
    assert_eq!(view["data"]["reminder_due"], true);

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&s.student_token),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_class_is_not_found() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;

    let (status, _) = send(&app, "GET", "/api/classrooms/9999", Some(&s.teacher_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
