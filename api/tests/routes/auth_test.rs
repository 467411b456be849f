use crate::helpers::{make_test_app, send};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_returns_token_and_user() {
    let (app, _) = make_test_app().await;
    let body = json!({
        "name": "Asha",
        "email": "Asha@Uni.edu",
        "role": "STUDENT",
        "course": "BTech",
        "semester": "5"
    });

    let (status, json) = send(&app, "POST", "/api/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert!(json["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["data"]["user"]["email"], "asha@uni.edu");
    assert_eq!(json["data"]["user"]["role"], "STUDENT");
    assert_eq!(json["data"]["user"]["course"], "BTech");
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (app, _) = make_test_app().await;
    let body = json!({ "name": "Asha", "email": "asha@uni.edu", "role": "STUDENT" });

    let (first, _) = send(&app, "POST", "/api/auth/register", None, Some(body.clone())).await;
    let (second, json) = send(&app, "POST", "/api/auth/register", None, Some(body)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn register_rejects_invalid_email() {
    let (app, _) = make_test_app().await;
    let body = json!({ "name": "Asha", "email": "not-an-email", "role": "TEACHER" });

    let (status, json) = send(&app, "POST", "/api/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn login_then_me_round_trip() {
    let (app, _) = make_test_app().await;
    let body = json!({ "name": "Ravi", "email": "ravi@uni.edu", "role": "TEACHER" });
    send(&app, "POST", "/api/auth/register", None, Some(body)).await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": " RAVI@uni.edu " })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = json["data"]["token"].as_str().unwrap().to_owned();

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["name"], "Ravi");
    assert_eq!(me["data"]["role"], "TEACHER");
}

#[tokio::test]
async fn login_unknown_email_is_not_found() {
    let (app, _) = make_test_app().await;
    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ghost@uni.edu" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn me_requires_token() {
    let (app, _) = make_test_app().await;
    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
