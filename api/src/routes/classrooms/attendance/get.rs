use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use super::common::SessionListQuery;
use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// GET /api/classrooms/{classroom_id}/attendance/sessions?date=YYYY-MM-DD
///
/// Newest first, each with `present_count` and `student_count`.
pub async fn list_sessions(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
    Query(q): Query<SessionListQuery>,
) -> Response {
    match app_state
        .attendance()
        .list_sessions(classroom_id, q.date, Utc::now())
        .await
    {
        Ok(sessions) => ok(StatusCode::OK, sessions, "Attendance sessions retrieved"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/sessions/active
///
/// `data` is `null` when no window is open. A session whose end time has
/// passed is never returned.
pub async fn active_session(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
) -> Response {
    match app_state
        .attendance()
        .active_session(classroom_id, Utc::now())
        .await
    {
        Ok(Some(view)) => ok(StatusCode::OK, Some(view), "Active attendance session"),
        Ok(None) => ok(
            StatusCode::OK,
            None::<services::attendance::SessionView>,
            "No active attendance session",
        ),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/sessions/{session_id}
pub async fn get_session(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
) -> Response {
    match app_state
        .attendance()
        .get_session(classroom_id, session_id, Utc::now())
        .await
    {
        Ok(view) => ok(StatusCode::OK, view, "Attendance session retrieved"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/sessions/{session_id}/records
pub async fn list_session_records(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
) -> Response {
    let svc = app_state.attendance();
    if let Err(e) = svc.session_in(classroom_id, session_id).await {
        return error_response(e);
    }
    match svc.records(session_id).await {
        Ok(records) => ok(StatusCode::OK, records, "Attendance records retrieved"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/sessions/{session_id}/records/me
///
/// `data` is `null` if the caller has not submitted for this session.
pub async fn my_record(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let svc = app_state.attendance();
    if let Err(e) = svc.session_in(classroom_id, session_id).await {
        return error_response(e);
    }
    match svc.record_for_student(session_id, user.id()).await {
        Ok(record) => ok(StatusCode::OK, record, "Attendance record retrieved"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/sessions/{session_id}/roster
///
/// Every enrolled student with PRESENT, BUNK or ABSENT. `final` turns true
/// once the window has closed.
pub async fn session_roster(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
) -> Response {
    match app_state
        .attendance()
        .roster(classroom_id, session_id, Utc::now())
        .await
    {
        Ok(roster) => ok(StatusCode::OK, roster, "Attendance roster retrieved"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}/attendance/summary
///
/// The caller's attendance rate in this class against its threshold.
pub async fn attendance_summary(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match app_state
        .attendance()
        .attendance_summary(classroom_id, user.id())
        .await
    {
        Ok(summary) => ok(StatusCode::OK, summary, "Attendance summary retrieved"),
        Err(e) => error_response(e),
    }
}
