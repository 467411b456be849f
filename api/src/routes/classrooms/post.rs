use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use services::classroom::CreateClassroom;

use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// POST /api/classrooms
///
/// ### Request Body
/// ```json
/// { "name": "Physics", "semester": "3", "schedule": "Mon/Wed 09:00" }
/// ```
pub async fn create_classroom(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateClassroom>,
) -> Response {
    let teacher = match app_state.users().get(user.id()).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match app_state.classrooms().create(&teacher, req).await {
        Ok(class) => ok(StatusCode::CREATED, class, "Classroom created successfully"),
        Err(e) => error_response(e),
    }
}

/// POST /api/classrooms/{classroom_id}/join
///
/// Joining a class twice succeeds without creating a second enrolment.
pub async fn join_classroom(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let student = match app_state.users().get(user.id()).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match app_state.classrooms().join(classroom_id, &student).await {
        Ok(class) => ok(StatusCode::OK, class, "Joined classroom"),
        Err(e) => error_response(e),
    }
}
