use chrono::{DateTime, Utc};
use db::models::attendance_record::{self, AttendanceStatus};
use db::models::attendance_session::{self, CloseReason};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStarted {
    pub classroom_id: i64,
    pub session_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&attendance_session::Model> for SessionStarted {
    fn from(s: &attendance_session::Model) -> Self {
        Self {
            classroom_id: s.classroom_id,
            session_id: s.id,
            start_time: s.start_time,
            end_time: s.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionClosed {
    pub classroom_id: i64,
    pub session_id: i64,
    pub reason: Option<CloseReason>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<&attendance_session::Model> for SessionClosed {
    fn from(s: &attendance_session::Model) -> Self {
        Self {
            classroom_id: s.classroom_id,
            session_id: s.id,
            reason: s.close_reason,
            closed_at: s.closed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceMarked {
    pub session_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub status: AttendanceStatus,
    pub distance_meters: f64,
    pub marked_at: DateTime<Utc>,
}

impl From<&attendance_record::Model> for AttendanceMarked {
    fn from(r: &attendance_record::Model) -> Self {
        Self {
            session_id: r.session_id,
            student_id: r.student_id,
            student_name: r.student_name.clone(),
            status: r.status,
            distance_meters: r.distance_meters,
            marked_at: r.marked_at,
        }
    }
}
