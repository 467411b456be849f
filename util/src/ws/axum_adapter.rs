use super::WebSocketManager;
use super::handler_trait::WsHandler;
use super::serve::{WsServerOptions, serve_topic};
use axum::{
    extract::{WebSocketUpgrade, ws::WebSocket},
    response::IntoResponse,
};
use std::sync::Arc;

/// Upgrades the request and serves `topic` with `handler` on the new socket.
pub fn ws_route<H>(
    ws: WebSocketUpgrade,
    manager: WebSocketManager,
    user_id: Option<i64>,
    topic: String,
    handler: Arc<H>,
    opts: WsServerOptions,
) -> impl IntoResponse
where
    H: WsHandler,
{
    ws.on_upgrade(move |socket: WebSocket| async move {
        serve_topic(socket, manager, topic, user_id, handler, opts).await;
    })
}
