use axum::{
    Extension,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
};
use std::sync::Arc;
use util::ws::axum_adapter::ws_route;
use util::ws::serve::WsServerOptions;

use super::topics::{attendance_session_topic, classroom_attendance_topic};
use super::ws_handlers::AttendanceWsHandler;
use crate::auth::AuthUser;
use crate::state::AppState;

/// `/ws/classrooms/{classroom_id}/attendance`
pub async fn classroom_attendance_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(classroom_id): Path<i64>,
) -> impl IntoResponse {
    ws_route(
        ws,
        app_state.ws_clone(),
        Some(user.id()),
        classroom_attendance_topic(classroom_id),
        Arc::new(AttendanceWsHandler),
        WsServerOptions::default(),
    )
}

/// `/ws/attendance/sessions/{session_id}`
pub async fn attendance_session_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(session_id): Path<i64>,
) -> impl IntoResponse {
    ws_route(
        ws,
        app_state.ws_clone(),
        Some(user.id()),
        attendance_session_topic(session_id),
        Arc::new(AttendanceWsHandler),
        WsServerOptions::default(),
    )
}
