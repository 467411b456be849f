use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// GET /api/classrooms
///
/// Teachers get the classes they own, students the classes they joined.
pub async fn list_classrooms(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let viewer = match app_state.users().get(user.id()).await {
        Ok(u) => u,
        Err(e) => return error_response(e),
    };

    match app_state.classrooms().list_for(&viewer, Utc::now()).await {
        Ok(classes) => ok(StatusCode::OK, classes, "Classrooms retrieved successfully"),
        Err(e) => error_response(e),
    }
}

/// GET /api/classrooms/{classroom_id}
///
/// `reminder_due` is true when the next class starts within the hour.
pub async fn get_classroom(
    State(app_state): State<AppState>,
    Path(classroom_id): Path<i64>,
) -> Response {
    let svc = app_state.classrooms();
    let class = match svc.get(classroom_id).await {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };
    match svc.view(class, Utc::now()).await {
        Ok(view) => ok(StatusCode::OK, view, "Classroom retrieved successfully"),
        Err(e) => error_response(e),
    }
}
