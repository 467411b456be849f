//! `/api/classrooms/{classroom_id}/attendance/...`
//!
//! Teachers open a 60-second check-in window anchored at their location and
//! watch the roster fill up; students submit one location sample per session.

use crate::auth::guards::{allow_classroom_member, allow_classroom_student, allow_classroom_teacher};
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

mod common;
mod get;
mod post;

pub use common::{MarkAttendanceReq, SessionListQuery, StartSessionReq};
pub use get::{
    active_session, attendance_summary, get_session, list_session_records, list_sessions,
    my_record, session_roster,
};
pub use post::{close_session, mark_attendance, start_session};

pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    let member = || from_fn_with_state(app_state.clone(), allow_classroom_member);
    let teacher = || from_fn_with_state(app_state.clone(), allow_classroom_teacher);
    let student = || from_fn_with_state(app_state.clone(), allow_classroom_student);

    Router::new()
        .route("/summary", get(attendance_summary).route_layer(student()))
        .route("/sessions", post(start_session).route_layer(teacher()))
        .route("/sessions", get(list_sessions).route_layer(member()))
        .route("/sessions/active", get(active_session).route_layer(member()))
        .route("/sessions/{session_id}", get(get_session).route_layer(member()))
        .route("/sessions/{session_id}/close", post(close_session).route_layer(teacher()))
        .route("/sessions/{session_id}/mark", post(mark_attendance).route_layer(student()))
        .route(
            "/sessions/{session_id}/records",
            get(list_session_records).route_layer(teacher()),
        )
        .route("/sessions/{session_id}/records/me", get(my_record).route_layer(member()))
        .route("/sessions/{session_id}/roster", get(session_roster).route_layer(teacher()))
        .with_state(app_state)
}
