//! Storage seam for attendance sessions and records.
//!
//! Everything the session protocol needs from persistence goes through
//! [`AttendanceRepository`]. Two implementations ship: [`SeaOrmAttendanceRepository`]
//! for the real database and [`InMemoryAttendanceRepository`] for tests and
//! embedding.
//!
//! Both guarantee the two properties the protocol relies on:
//! - `close_session` performs the OPEN -> CLOSED transition at most once.
//! - `insert_record_if_absent` never produces two records for one
//!   (session, student) pair, regardless of concurrent callers.

mod memory;
mod seaorm;

pub use memory::InMemoryAttendanceRepository;
pub use seaorm::SeaOrmAttendanceRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::models::attendance_record::{self, AttendanceStatus};
use crate::models::attendance_session::{self, CloseReason};

/// Parameters for opening a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub classroom_id: i64,
    pub started_by: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub anchor_lat: f64,
    pub anchor_lng: f64,
}

/// The freshly opened session plus whatever it superseded.
#[derive(Debug, Clone)]
pub struct OpenedSession {
    pub session: attendance_session::Model,
    pub superseded: Vec<attendance_session::Model>,
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    pub session_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub marked_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub distance_meters: f64,
}

/// Result of an insert-if-absent.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordInsert {
    Inserted(attendance_record::Model),
    /// A record already existed; it is returned unchanged.
    Existing(attendance_record::Model),
}

impl RecordInsert {
    pub fn record(&self) -> &attendance_record::Model {
        match self {
            RecordInsert::Inserted(r) | RecordInsert::Existing(r) => r,
        }
    }

    pub fn into_record(self) -> attendance_record::Model {
        match self {
            RecordInsert::Inserted(r) | RecordInsert::Existing(r) => r,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, RecordInsert::Inserted(_))
    }
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Closes every OPEN session of the classroom as `Superseded` and opens a
    /// new one, atomically.
    async fn open_session(&self, new: NewSession) -> Result<OpenedSession, DbErr>;

    async fn find_session(&self, id: i64) -> Result<Option<attendance_session::Model>, DbErr>;

    /// The classroom's OPEN session, if any, regardless of its end time.
    async fn open_session_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Option<attendance_session::Model>, DbErr>;

    /// All sessions of a classroom, newest first.
    async fn sessions_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Vec<attendance_session::Model>, DbErr>;

    /// OPEN -> CLOSED. Returns the closed session only when this call made the
    /// transition; `None` if it was already closed or does not exist.
    async fn close_session(
        &self,
        id: i64,
        reason: CloseReason,
        at: DateTime<Utc>,
    ) -> Result<Option<attendance_session::Model>, DbErr>;

    /// Closes every OPEN session whose end time is at or before `now` as
    /// `Expired`, returning the ones this call closed.
    async fn close_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<attendance_session::Model>, DbErr>;

    async fn insert_record_if_absent(&self, new: NewRecord) -> Result<RecordInsert, DbErr>;

    async fn records_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr>;

    async fn record_for_student(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<attendance_record::Model>, DbErr>;

    async fn present_count(&self, session_id: i64) -> Result<u64, DbErr>;

    /// Every record the student holds across the classroom's sessions.
    async fn records_for_student_in_classroom(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr>;
}
