//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Register, login (public) and `me` (authenticated)
//! - `/classrooms` → Classes, enrolment and attendance (authenticated)

use crate::auth::guards::allow_authenticated;
use crate::routes::{auth::auth_routes, classrooms::classroom_routes, health::health_routes};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod auth;
pub mod classrooms;
pub mod common;
pub mod health;

/// Builds every `/api` route with `AppState` as its state type.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/classrooms",
            classroom_routes(app_state.clone()).route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
