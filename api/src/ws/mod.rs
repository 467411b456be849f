//! Websocket entry points under `/ws`.
//!
//! Each connection subscribes to one topic. Tokens may be passed as
//! `?token=` because browsers cannot set headers on websocket upgrades.

use axum::{Router, middleware::from_fn};

use crate::{auth::guards::allow_authenticated, state::AppState};

pub mod attendance;
pub mod core;

pub fn ws_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .merge(attendance::ws_attendance_routes(app_state.clone()))
        .route_layer(from_fn(allow_authenticated))
        .with_state(app_state)
}
