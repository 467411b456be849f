use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AttendanceRepository, NewRecord, NewSession, OpenedSession, RecordInsert};
use crate::models::attendance_record;
use crate::models::attendance_session::{self, CloseReason, SessionState};

#[derive(Default)]
struct Store {
    sessions: Vec<attendance_session::Model>,
    records: Vec<attendance_record::Model>,
    next_session_id: i64,
    next_record_id: i64,
}

impl Store {
    fn close(
        &mut self,
        id: i64,
        reason: CloseReason,
        at: DateTime<Utc>,
    ) -> Option<attendance_session::Model> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == id && s.state == SessionState::Open)?;
        session.state = SessionState::Closed;
        session.close_reason = Some(reason);
        session.closed_at = Some(at);
        Some(session.clone())
    }
}

/// Process-local [`AttendanceRepository`]. A single lock guards the whole
/// store, so each operation is atomic with respect to the others.
///
/// `records_for_student_in_classroom` only sees sessions opened through this
/// repository.
#[derive(Clone, Default)]
pub struct InMemoryAttendanceRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryAttendanceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryAttendanceRepository {
    async fn open_session(&self, new: NewSession) -> Result<OpenedSession, DbErr> {
        let mut store = self.store.write().await;

        let prior: Vec<i64> = store
            .sessions
            .iter()
            .filter(|s| s.classroom_id == new.classroom_id && s.state == SessionState::Open)
            .map(|s| s.id)
            .collect();
        let superseded = prior
            .into_iter()
            .filter_map(|id| store.close(id, CloseReason::Superseded, new.start_time))
            .collect();

        store.next_session_id += 1;
        let session = attendance_session::Model {
            id: store.next_session_id,
            classroom_id: new.classroom_id,
            started_by: new.started_by,
            start_time: new.start_time,
            end_time: new.end_time,
            state: SessionState::Open,
            close_reason: None,
            closed_at: None,
            anchor_lat: new.anchor_lat,
            anchor_lng: new.anchor_lng,
        };
        store.sessions.push(session.clone());

        Ok(OpenedSession {
            session,
            superseded,
        })
    }

    async fn find_session(&self, id: i64) -> Result<Option<attendance_session::Model>, DbErr> {
        let store = self.store.read().await;
        Ok(store.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn open_session_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Option<attendance_session::Model>, DbErr> {
        let store = self.store.read().await;
        Ok(store
            .sessions
            .iter()
            .rev()
            .find(|s| s.classroom_id == classroom_id && s.state == SessionState::Open)
            .cloned())
    }

    async fn sessions_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Vec<attendance_session::Model>, DbErr> {
        let store = self.store.read().await;
        Ok(store
            .sessions
            .iter()
            .rev()
            .filter(|s| s.classroom_id == classroom_id)
            .cloned()
            .collect())
    }

    async fn close_session(
        &self,
        id: i64,
        reason: CloseReason,
        at: DateTime<Utc>,
    ) -> Result<Option<attendance_session::Model>, DbErr> {
        Ok(self.store.write().await.close(id, reason, at))
    }

    async fn close_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<attendance_session::Model>, DbErr> {
        let mut store = self.store.write().await;
        let stale: Vec<i64> = store
            .sessions
            .iter()
            .filter(|s| s.is_stale_at(now))
            .map(|s| s.id)
            .collect();
        Ok(stale
            .into_iter()
            .filter_map(|id| store.close(id, CloseReason::Expired, now))
            .collect())
    }

    async fn insert_record_if_absent(&self, new: NewRecord) -> Result<RecordInsert, DbErr> {
        let mut store = self.store.write().await;

        if let Some(existing) = store
            .records
            .iter()
            .find(|r| r.session_id == new.session_id && r.student_id == new.student_id)
        {
            return Ok(RecordInsert::Existing(existing.clone()));
        }

        store.next_record_id += 1;
        let record = attendance_record::Model {
            id: store.next_record_id,
            session_id: new.session_id,
            student_id: new.student_id,
            student_name: new.student_name,
            marked_at: new.marked_at,
            status: new.status,
            distance_meters: new.distance_meters,
        };
        store.records.push(record.clone());
        Ok(RecordInsert::Inserted(record))
    }

    async fn records_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr> {
        let store = self.store.read().await;
        Ok(store
            .records
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn record_for_student(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<attendance_record::Model>, DbErr> {
        let store = self.store.read().await;
        Ok(store
            .records
            .iter()
            .find(|r| r.session_id == session_id && r.student_id == student_id)
            .cloned())
    }

    async fn present_count(&self, session_id: i64) -> Result<u64, DbErr> {
        let store = self.store.read().await;
        Ok(store
            .records
            .iter()
            .filter(|r| r.session_id == session_id && r.is_present())
            .count() as u64)
    }

    async fn records_for_student_in_classroom(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr> {
        let store = self.store.read().await;
        let sessions: HashMap<i64, i64> = store
            .sessions
            .iter()
            .map(|s| (s.id, s.classroom_id))
            .collect();
        Ok(store
            .records
            .iter()
            .filter(|r| {
                r.student_id == student_id && sessions.get(&r.session_id) == Some(&classroom_id)
            })
            .cloned()
            .collect())
    }
}
