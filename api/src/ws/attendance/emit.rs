use async_trait::async_trait;
use db::models::{attendance_record, attendance_session};
use serde::Serialize;
use services::attendance::AttendanceEvents;
use util::ws::WebSocketManager;

use super::payload;
use super::topics::{attendance_session_topic, classroom_attendance_topic};
use crate::ws::core::{envelope, event::Event};

#[derive(Debug, Serialize)]
pub struct SessionStartedEvent {
    #[serde(flatten)]
    pub payload: payload::SessionStarted,
}
impl Event for SessionStartedEvent {
    const NAME: &'static str = "attendance.session_started";
    fn topic_path(&self) -> String {
        classroom_attendance_topic(self.payload.classroom_id)
    }
}

#[derive(Debug, Serialize)]
pub struct SessionClosedEvent {
    #[serde(flatten)]
    pub payload: payload::SessionClosed,
}
impl Event for SessionClosedEvent {
    const NAME: &'static str = "attendance.session_closed";
    fn topic_path(&self) -> String {
        classroom_attendance_topic(self.payload.classroom_id)
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceMarkedEvent {
    #[serde(flatten)]
    pub payload: payload::AttendanceMarked,
}
impl Event for AttendanceMarkedEvent {
    const NAME: &'static str = "attendance.marked";
    fn topic_path(&self) -> String {
        attendance_session_topic(self.payload.session_id)
    }
}

/* ---------- one-liner helpers ---------- */

pub async fn session_started(ws: &WebSocketManager, p: payload::SessionStarted) {
    envelope::emit(ws, &SessionStartedEvent { payload: p }).await;
}

pub async fn session_closed(ws: &WebSocketManager, p: payload::SessionClosed) {
    envelope::emit(ws, &SessionClosedEvent { payload: p }).await;
}

pub async fn attendance_marked(ws: &WebSocketManager, p: payload::AttendanceMarked) {
    envelope::emit(ws, &AttendanceMarkedEvent { payload: p }).await;
}

/// Pushes attendance lifecycle changes onto the websocket topics.
#[derive(Clone)]
pub struct WsAttendanceEvents {
    ws: WebSocketManager,
}

impl WsAttendanceEvents {
    pub fn new(ws: WebSocketManager) -> Self {
        Self { ws }
    }
}

#[async_trait]
impl AttendanceEvents for WsAttendanceEvents {
    async fn session_started(&self, session: &attendance_session::Model) {
        session_started(&self.ws, session.into()).await;
    }

    async fn session_closed(&self, session: &attendance_session::Model) {
        session_closed(&self.ws, session.into()).await;
    }

    async fn record_marked(
        &self,
        _session: &attendance_session::Model,
        record: &attendance_record::Model,
    ) {
        attendance_marked(&self.ws, record.into()).await;
    }
}
