use serde::Deserialize;
use serde_json::json;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;

/// Client messages on attendance topics. `{"type":"ping"}` is answered by the
/// transport before it reaches here.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttendanceIncoming {
    /// Ask who else is connected to this topic.
    Presence,
}

pub struct AttendanceWsHandler;

impl WsHandler for AttendanceWsHandler {
    type In = AttendanceIncoming;

    async fn on_open(&self, ctx: &WsContext) {
        tracing::debug!(topic = %ctx.topic, user = ?ctx.user_id, "Attendance subscriber joined");
    }

    async fn on_message(&self, ctx: &WsContext, msg: Self::In) {
        match msg {
            AttendanceIncoming::Presence => {
                let users = ctx.ws.present_users(&ctx.topic).await;
                let _ = ctx
                    .reply_json(&json!({
                        "type": "presence",
                        "topic": ctx.topic,
                        "payload": { "user_ids": users },
                        "ts": chrono::Utc::now().to_rfc3339(),
                    }))
                    .await;
            }
        }
    }
}
