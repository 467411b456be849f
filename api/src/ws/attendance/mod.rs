use axum::{Router, middleware::from_fn_with_state, routing::get};

use crate::auth::guards::{allow_classroom_member, allow_session_teacher};
use crate::state::AppState;

pub mod emit;
pub mod handlers;
pub mod payload;
pub mod topics;
pub mod ws_handlers;

use handlers::{attendance_session_ws_handler, classroom_attendance_ws_handler};

/// - `/classrooms/{classroom_id}/attendance`: session started/closed, for members
/// - `/attendance/sessions/{session_id}`: live marks, for the class teacher
pub fn ws_attendance_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/classrooms/{classroom_id}/attendance",
            get(classroom_attendance_ws_handler)
                .route_layer(from_fn_with_state(app_state.clone(), allow_classroom_member)),
        )
        .route(
            "/attendance/sessions/{session_id}",
            get(attendance_session_ws_handler)
                .route_layer(from_fn_with_state(app_state.clone(), allow_session_teacher)),
        )
}
