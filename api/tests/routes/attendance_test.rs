use crate::helpers::{Seed, make_test_app, seed, send};
use axum::{Router, http::StatusCode};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use services::geo::Coordinate;

fn base(s: &Seed) -> String {
    format!("/api/classrooms/{}/attendance", s.classroom.id)
}

async fn start(app: &Router, s: &Seed) -> i64 {
    let (status, json) = send(
        app,
        "POST",
        &format!("{}/sessions", base(s)),
        Some(&s.teacher_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    json["data"]["session"]["id"].as_i64().unwrap()
}

async fn mark(app: &Router, s: &Seed, session_id: i64, body: Value) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("{}/sessions/{session_id}/mark", base(s)),
        Some(&s.student_token),
        Some(body),
    )
    .await
}

#[tokio::test]
async fn start_opens_a_sixty_second_window() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("{}/sessions", base(&s)),
        Some(&s.teacher_token),
        Some(json!({ "latitude": 28.6139, "longitude": 77.2090 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let session = &json["data"]["session"];
    assert_eq!(session["state"], "OPEN");
    assert_eq!(session["active"], true);
    let remaining = session["remaining_seconds"].as_i64().unwrap();
    assert!((59..=60).contains(&remaining));
    assert!(json["data"]["superseded"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn start_requires_teacher_location() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("{}/sessions", base(&s)),
        Some(&s.teacher_token),
        Some(json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn only_owning_teacher_may_start() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("{}/sessions", base(&s)),
        Some(&s.student_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn second_start_supersedes_the_first() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let first = start(&app, &s).await;

    let (_, json) = send(
        &app,
        "POST",
        &format!("{}/sessions", base(&s)),
        Some(&s.teacher_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    let superseded = json["data"]["superseded"].as_array().unwrap();
    assert_eq!(superseded.len(), 1);
    assert_eq!(superseded[0]["id"], first);
    assert_eq!(superseded[0]["close_reason"], "SUPERSEDED");

    let (_, old) = send(
        &app,
        "GET",
        &format!("{}/sessions/{first}", base(&s)),
        Some(&s.student_token),
        None,
    )
    .await;
    assert_eq!(old["data"]["state"], "CLOSED");
    assert_eq!(old["data"]["active"], false);
}

#[tokio::test]
async fn mark_inside_geofence_is_present() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (status, json) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.0004 })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["record"]["status"], "PRESENT");
    assert_eq!(json["data"]["already_recorded"], false);
    let d = json["data"]["record"]["distance_meters"].as_f64().unwrap();
    assert!((d - 44.48).abs() < 0.1, "distance {d}");
}

#[tokio::test]
async fn mark_outside_geofence_is_bunk() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (status, json) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.00045 })).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["record"]["status"], "BUNK");
}

#[tokio::test]
async fn second_mark_returns_first_record_unchanged() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (_, first) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.00045 })).await;
    let (status, second) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.0 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["message"], "Attendance already recorded");
    assert_eq!(second["data"]["already_recorded"], true);
    assert_eq!(second["data"]["record"], first["data"]["record"]);
    assert_eq!(second["data"]["record"]["status"], "BUNK");
}

#[tokio::test]
async fn mark_without_location_writes_nothing_and_can_retry() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (status, json) = mark(&app, &s, sid, json!({ "lat": null, "lng": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Location access needed to mark attendance.");

    let (_, mine) = send(
        &app,
        "GET",
        &format!("{}/sessions/{sid}/records/me", base(&s)),
        Some(&s.student_token),
        None,
    )
    .await;
    assert!(mine["data"].is_null());

    let (status, _) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.0001 })).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn mark_rejects_out_of_range_coordinates() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (status, _) = mark(&app, &s, sid, json!({ "lat": 91.0, "lng": 0.0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mark_after_close_conflicts() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let close = format!("{}/sessions/{sid}/close", base(&s));
    let (status, json) = send(&app, "POST", &close, Some(&s.teacher_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["closed_now"], true);
    assert_eq!(json["data"]["session"]["close_reason"], "MANUAL");

    let (status, json) = send(&app, "POST", &close, Some(&s.teacher_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["closed_now"], false);

    let (status, _) = mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.0 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn non_member_cannot_mark() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("{}/sessions/{sid}/mark", base(&s)),
        Some(&s.outsider_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn active_is_null_once_the_window_has_passed() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let past = Utc::now() - Duration::minutes(5);
    let stale = state
        .attendance()
        .start_session(s.classroom.id, s.teacher.id, Some(Coordinate::new(0.0, 0.0)), past)
        .await
        .unwrap();

    let (status, json) = send(
        &app,
        "GET",
        &format!("{}/sessions/active", base(&s)),
        Some(&s.student_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].is_null());

    let (_, session) = send(
        &app,
        "GET",
        &format!("{}/sessions/{}", base(&s), stale.session.session.id),
        Some(&s.teacher_token),
        None,
    )
    .await;
    assert_eq!(session["data"]["state"], "CLOSED");
    assert_eq!(session["data"]["close_reason"], "EXPIRED");
}

#[tokio::test]
async fn active_returns_the_open_session() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;

    let (_, json) = send(
        &app,
        "GET",
        &format!("{}/sessions/active", base(&s)),
        Some(&s.student_token),
        None,
    )
    .await;
    assert_eq!(json["data"]["id"], sid);
    assert!(json["data"]["remaining_seconds"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn roster_marks_missing_students_absent_after_the_window() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;
    let roster = format!("{}/sessions/{sid}/roster", base(&s));

    let (_, live) = send(&app, "GET", &roster, Some(&s.teacher_token), None).await;
    assert_eq!(live["data"]["final"], false);

    send(
        &app,
        "POST",
        &format!("{}/sessions/{sid}/close", base(&s)),
        Some(&s.teacher_token),
        None,
    )
    .await;

    let (status, json) = send(&app, "GET", &roster, Some(&s.teacher_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["final"], true);
    assert_eq!(json["data"]["present"], 0);
    assert_eq!(json["data"]["absent"], 1);
    let entries = json["data"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["student_id"], s.student.id);
    assert_eq!(entries[0]["status"], "ABSENT");

    let (status, _) = send(&app, "GET", &roster, Some(&s.student_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn records_and_history_reflect_marks() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let sid = start(&app, &s).await;
    mark(&app, &s, sid, json!({ "lat": 0.0, "lng": 0.0001 })).await;

    let (_, records) = send(
        &app,
        "GET",
        &format!("{}/sessions/{sid}/records", base(&s)),
        Some(&s.teacher_token),
        None,
    )
    .await;
    assert_eq!(records["data"].as_array().unwrap().len(), 1);

    let (_, list) = send(
        &app,
        "GET",
        &format!("{}/sessions", base(&s)),
        Some(&s.teacher_token),
        None,
    )
    .await;
    let sessions = list["data"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["present_count"], 1);
    assert_eq!(sessions[0]["student_count"], 1);

    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d");
    let (_, filtered) = send(
        &app,
        "GET",
        &format!("{}/sessions?date={tomorrow}", base(&s)),
        Some(&s.teacher_token),
        None,
    )
    .await;
    assert!(filtered["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn summary_counts_present_sessions_against_threshold() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let summary = format!("{}/summary", base(&s));

    let (_, empty) = send(&app, "GET", &summary, Some(&s.student_token), None).await;
    assert_eq!(empty["data"]["total_sessions"], 0);
    assert_eq!(empty["data"]["rate"], 100);
    assert_eq!(empty["data"]["below_threshold"], false);

    let first = start(&app, &s).await;
    mark(&app, &s, first, json!({ "lat": 0.0, "lng": 0.0 })).await;
    start(&app, &s).await;

    let (status, json) = send(&app, "GET", &summary, Some(&s.student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_sessions"], 2);
    assert_eq!(json["data"]["present"], 1);
    assert_eq!(json["data"]["rate"], 50);
    assert_eq!(json["data"]["below_threshold"], true);
}
