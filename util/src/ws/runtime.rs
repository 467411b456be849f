use crate::ws::WebSocketManager;
use axum::extract::ws::{Message, Utf8Bytes};
use serde::Serialize;
use tokio::sync::mpsc;

/// Per-connection handle given to a `WsHandler`.
pub struct WsContext {
    pub topic: String,
    pub user_id: Option<i64>,
    pub ws: WebSocketManager,
    out_tx: mpsc::Sender<Message>,
}

impl WsContext {
    pub fn new(
        topic: String,
        user_id: Option<i64>,
        ws: WebSocketManager,
        out_tx: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            topic,
            user_id,
            ws,
            out_tx,
        }
    }

    /// Send a single text frame to this client only.
    pub async fn reply_text(&self, text: impl Into<Utf8Bytes>) -> Result<(), ()> {
        self.out_tx
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| ())
    }

    /// Serialize `value` and send it to this client only.
    pub async fn reply_json<T: Serialize>(&self, value: &T) -> Result<(), ()> {
        let text = serde_json::to_string(value).map_err(|_| ())?;
        self.reply_text(text).await
    }

    pub async fn reply_pong(&self, payload: bytes::Bytes) -> Result<(), ()> {
        self.out_tx
            .send(Message::Pong(payload))
            .await
            .map_err(|_| ())
    }

    /// Broadcast a JSON envelope on this connection's topic.
    pub async fn emit<T: Serialize>(&self, event: &str, payload: &T) {
        crate::ws::emit(&self.ws, &self.topic, event, payload).await;
    }
}
