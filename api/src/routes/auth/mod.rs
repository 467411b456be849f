//! Email-only identity: `/api/auth/register`, `/api/auth/login`, `/api/auth/me`.

use crate::auth::guards::allow_authenticated;
use crate::state::AppState;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use db::models::user;
use serde::Serialize;

pub mod get;
pub mod post;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(post::register))
        .route("/login", post(post::login))
        .route("/me", get(get::me).route_layer(from_fn(allow_authenticated)))
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: user::Role,
    pub mobile: Option<String>,
    pub course: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            mobile: u.mobile,
            course: u.course,
            branch: u.branch,
            semester: u.semester,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}
