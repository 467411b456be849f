pub mod auth;
pub mod response;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod ws;

use axum::{
    Router,
    http::header::CONTENT_TYPE,
    middleware::from_fn,
};
use tower_http::cors::CorsLayer;

use crate::auth::middleware::log_request;
use crate::routes::routes;
use crate::state::AppState;
use crate::ws::ws_routes;

/// Full application: `/api` HTTP routes, `/ws` topics, request logging and CORS.
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` to get
/// peer addresses in the request log.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state.clone()))
        .with_state(app_state)
        .layer(from_fn(log_request))
        .layer(cors)
}
