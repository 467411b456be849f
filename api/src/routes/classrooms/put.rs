use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use services::classroom::UpdateClassroom;

use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// PUT /api/classrooms/{classroom_id}
///
/// Any subset of `name`, `semester`, `schedule`, `attendance_threshold`
/// (0-100) and `next_class_time` (RFC 3339, or `null` to clear).
pub async fn update_classroom(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UpdateClassroom>,
) -> Response {
    match app_state
        .classrooms()
        .update(classroom_id, user.id(), req)
        .await
    {
        Ok(class) => ok(StatusCode::OK, class, "Classroom updated successfully"),
        Err(e) => error_response(e),
    }
}
