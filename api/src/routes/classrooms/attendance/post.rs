use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use super::common::{MarkAttendanceReq, StartSessionReq};
use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// POST /api/classrooms/{classroom_id}/attendance/sessions
///
/// Opens a 60-second window anchored at the teacher's location. Any session
/// still open for this class is closed as `SUPERSEDED`.
///
/// ### Request Body
/// ```json
/// { "lat": 28.6139, "lng": 77.2090 }
/// ```
///
/// ### Responses
/// - `201 Created` with the session, its `remaining_seconds` and any superseded sessions
/// - `400 Bad Request` if the location is missing or out of range
pub async fn start_session(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<StartSessionReq>,
) -> Response {
    match app_state
        .attendance()
        .start_session(classroom_id, user.id(), body.anchor(), Utc::now())
        .await
    {
        Ok(started) => ok(StatusCode::CREATED, started, "Attendance session started"),
        Err(e) => error_response(e),
    }
}

/// POST /api/classrooms/{classroom_id}/attendance/sessions/{session_id}/close
///
/// Closing an already closed session returns it unchanged with `closed_now: false`.
pub async fn close_session(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match app_state
        .attendance()
        .close_session(classroom_id, session_id, user.id(), Utc::now())
        .await
    {
        Ok(closed) if closed.closed_now => {
            ok(StatusCode::OK, closed, "Attendance session closed")
        }
        Ok(closed) => ok(StatusCode::OK, closed, "Attendance session was already closed"),
        Err(e) => error_response(e),
    }
}

/// POST /api/classrooms/{classroom_id}/attendance/sessions/{session_id}/mark
///
/// ### Request Body
/// ```json
/// { "lat": 28.6140, "lng": 77.2091 }
/// ```
///
/// ### Responses
/// - `201 Created`: recorded as `PRESENT` (within 50 m of the anchor) or `BUNK`
/// - `200 OK`: a record already existed; it is returned unchanged with `already_recorded: true`
/// - `400 Bad Request`: no location; nothing is written and the student may retry
/// - `409 Conflict`: the window is closed
pub async fn mark_attendance(
    State(app_state): State<AppState>,
    Path((classroom_id, session_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<MarkAttendanceReq>,
) -> Response {
    let svc = app_state.attendance();
    let now = Utc::now();

    if let Err(e) = svc.session_in(classroom_id, session_id).await {
        return error_response(e);
    }
    let student = match app_state.users().get(user.id()).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match svc
        .mark_attendance(session_id, &student, body.sample(), now)
        .await
    {
        Ok(outcome) if outcome.already_recorded => {
            ok(StatusCode::OK, outcome, "Attendance already recorded")
        }
        Ok(outcome) => ok(StatusCode::CREATED, outcome, "Attendance marked"),
        Err(e) => error_response(e),
    }
}
