//! `/api/classrooms/...`: class management, enrolment and attendance.

use crate::auth::guards::{
    allow_classroom_member, allow_classroom_teacher, allow_student, allow_teacher,
};
use crate::state::AppState;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};

pub mod attendance;
pub mod get;
pub mod post;
pub mod put;

pub fn classroom_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(post::create_classroom).route_layer(from_fn(allow_teacher)))
        .route("/", get(get::list_classrooms))
        .route(
            "/{classroom_id}",
            get(get::get_classroom)
                .route_layer(from_fn_with_state(app_state.clone(), allow_classroom_member)),
        )
        .route(
            "/{classroom_id}",
            put(put::update_classroom)
                .route_layer(from_fn_with_state(app_state.clone(), allow_classroom_teacher)),
        )
        .route(
            "/{classroom_id}/join",
            post(post::join_classroom).route_layer(from_fn(allow_student)),
        )
        .nest(
            "/{classroom_id}/attendance",
            attendance::attendance_routes(app_state.clone()),
        )
        .with_state(app_state)
}
