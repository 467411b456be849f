use crate::helpers::{make_test_app, send};
use axum::http::StatusCode;

#[tokio::test]
async fn health_is_public() {
    let (app, _) = make_test_app().await;
    let (status, json) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn cors_exposes_only_content_type() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let (app, _) = make_test_app().await;
    let req = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    let exposed = res
        .headers()
        .get("access-control-expose-headers")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(exposed.contains("content-type"));
    assert!(!exposed.contains("content-disposition"));
}
