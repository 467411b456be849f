use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::user;
use serde::Deserialize;
use services::user::RegisterUser;
use validator::Validate;

use super::{TokenResponse, UserResponse};
use crate::auth::generate_jwt;
use crate::response::{ApiResponse, Empty, error_response, ok};
use crate::state::AppState;

fn issue(user: user::Model, status: StatusCode, message: &str) -> Response {
    match generate_jwt(user.id, user.role) {
        Ok((token, expires_at)) => ok(
            status,
            TokenResponse {
                token,
                expires_at,
                user: UserResponse::from(user),
            },
            message,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Token encoding failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Empty>::error("Failed to issue token")),
            )
                .into_response()
        }
    }
}

/// POST /api/auth/register
///
/// ### Request Body
/// ```json
/// { "name": "Asha", "email": "asha@uni.edu", "role": "STUDENT", "course": "BTech" }
/// ```
///
/// ### Responses
/// - `201 Created` with `{ token, expires_at, user }`
/// - `400 Bad Request` on validation failure
/// - `409 Conflict` if the email is taken
pub async fn register(
    State(app_state): State<AppState>,
    Json(req): Json<RegisterUser>,
) -> Response {
    match app_state.users().register(req).await {
        Ok(user) => issue(user, StatusCode::CREATED, "User registered successfully"),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// POST /api/auth/login
///
/// There is no password; the email alone identifies the account.
pub async fn login(State(app_state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let req = LoginRequest {
        email: user::normalize_email(&req.email),
    };
    if let Err(e) = req.validate() {
        return error_response(e.into());
    }

    match app_state.users().login(&req.email).await {
        Ok(user) => issue(user, StatusCode::OK, "Login successful"),
        Err(e) => error_response(e),
    }
}
