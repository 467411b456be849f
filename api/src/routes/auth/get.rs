use axum::{Extension, extract::State, http::StatusCode, response::Response};

use super::UserResponse;
use crate::auth::AuthUser;
use crate::response::{error_response, ok};
use crate::state::AppState;

/// GET /api/auth/me
pub async fn me(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match app_state.users().get(user.id()).await {
        Ok(u) => ok(StatusCode::OK, UserResponse::from(u), "User fetched successfully"),
        Err(e) => error_response(e),
    }
}
