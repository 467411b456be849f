//! Route guards applied with `from_fn` / `from_fn_with_state`.
//!
//! Every guard authenticates first and inserts the [`AuthUser`] into request
//! extensions, so handlers can take `Extension<AuthUser>`.

use crate::auth::claims::AuthUser;
use crate::response::{ApiResponse, Empty, status_for};
use crate::state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::classroom;
use services::ServiceError;
use std::collections::HashMap;

type GuardError = (StatusCode, Json<ApiResponse<Empty>>);

fn deny(status: StatusCode, message: impl Into<String>) -> GuardError {
    (status, Json(ApiResponse::error(message)))
}

fn from_service(err: ServiceError) -> GuardError {
    if let ServiceError::Database(e) = &err {
        tracing::warn!(error = %e, "DB error while checking access; denying");
        return deny(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    deny(status_for(&err), err.to_string())
}

/// Authenticates the request and stores the user in its extensions.
async fn extract_and_insert_authuser(
    mut req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), GuardError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| deny(StatusCode::UNAUTHORIZED, "Authentication required"))?;

    req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

fn id_param(params: &HashMap<String, String>, name: &str) -> Result<i64, GuardError> {
    params
        .get(name)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| deny(StatusCode::BAD_REQUEST, format!("Missing or invalid {name}")))
}

async fn load_classroom(
    app_state: &AppState,
    params: &HashMap<String, String>,
) -> Result<classroom::Model, GuardError> {
    let classroom_id = id_param(params, "classroom_id")?;
    app_state
        .classrooms()
        .get(classroom_id)
        .await
        .map_err(from_service)
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, GuardError> {
    let (req, _user) = extract_and_insert_authuser(req).await?;
    Ok(next.run(req).await)
}

/// Account role must be TEACHER.
pub async fn allow_teacher(req: Request<Body>, next: Next) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    if !user.is_teacher() {
        return Err(deny(StatusCode::FORBIDDEN, "Teacher access required"));
    }
    Ok(next.run(req).await)
}

/// Account role must be STUDENT.
pub async fn allow_student(req: Request<Body>, next: Next) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    if !user.is_student() {
        return Err(deny(StatusCode::FORBIDDEN, "Student access required"));
    }
    Ok(next.run(req).await)
}

/// The class teacher or an enrolled student of `{classroom_id}`.
pub async fn allow_classroom_member(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    let class = load_classroom(&app_state, &params).await?;

    let allowed = app_state
        .classrooms()
        .can_view(&class, user.id())
        .await
        .map_err(from_service)?;
    if !allowed {
        return Err(deny(
            StatusCode::FORBIDDEN,
            "You are not a member of this class",
        ));
    }
    Ok(next.run(req).await)
}

/// Only the teacher who owns `{classroom_id}`.
pub async fn allow_classroom_teacher(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    let class = load_classroom(&app_state, &params).await?;

    if class.teacher_id != user.id() {
        return Err(deny(
            StatusCode::FORBIDDEN,
            "Only the class teacher can do this",
        ));
    }
    Ok(next.run(req).await)
}

/// An enrolled student of `{classroom_id}`.
pub async fn allow_classroom_student(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    if !user.is_student() {
        return Err(deny(StatusCode::FORBIDDEN, "Student access required"));
    }
    let class = load_classroom(&app_state, &params).await?;

    let enrolled = classroom::Model::is_member(app_state.db(), class.id, user.id())
        .await
        .map_err(|e| from_service(e.into()))?;
    if !enrolled {
        return Err(deny(
            StatusCode::FORBIDDEN,
            "You are not enrolled in this class",
        ));
    }
    Ok(next.run(req).await)
}

/// The teacher owning the classroom of `{session_id}`.
pub async fn allow_session_teacher(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, user) = extract_and_insert_authuser(req).await?;
    let session_id = id_param(&params, "session_id")?;

    let session = app_state
        .attendance()
        .find_session(session_id)
        .await
        .map_err(from_service)?;
    let class = app_state
        .classrooms()
        .get(session.classroom_id)
        .await
        .map_err(from_service)?;

    if class.teacher_id != user.id() {
        return Err(deny(
            StatusCode::FORBIDDEN,
            "Only the class teacher can watch this session",
        ));
    }
    Ok(next.run(req).await)
}
