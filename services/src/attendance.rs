//! Geofenced attendance sessions.
//!
//! A teacher opens a 60-second window anchored at their current location.
//! Students submit one location sample each; the sample is classified against
//! the anchor once and stored. Sessions leave the OPEN state through exactly one
//! transition, whichever of these happens first:
//! - the background sweep (or any reader) notices the window elapsed (`EXPIRED`),
//! - the teacher starts another session for the class (`SUPERSEDED`),
//! - the teacher closes it (`MANUAL`).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::{self, AttendanceStatus};
use db::models::attendance_session::{self, CloseReason};
use db::models::classroom::{self, DEFAULT_ATTENDANCE_THRESHOLD};
use db::models::user;
use db::repository::{AttendanceRepository, NewRecord, NewSession, RecordInsert};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ServiceError;
use crate::geo::{self, Coordinate};

/// Receives lifecycle notifications after they are persisted.
#[async_trait]
pub trait AttendanceEvents: Send + Sync {
    async fn session_started(&self, _session: &attendance_session::Model) {}
    async fn session_closed(&self, _session: &attendance_session::Model) {}
    async fn record_marked(
        &self,
        _session: &attendance_session::Model,
        _record: &attendance_record::Model,
    ) {
    }
}

/// Discards every notification.
pub struct NoEvents;

impl AttendanceEvents for NoEvents {}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: attendance_session::Model,
    pub active: bool,
    pub remaining_seconds: i64,
}

impl SessionView {
    pub fn at(session: attendance_session::Model, now: DateTime<Utc>) -> Self {
        Self {
            active: session.is_active_at(now),
            remaining_seconds: session.remaining_seconds(now),
            session,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
    pub session: SessionView,
    pub superseded: Vec<attendance_session::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosedSession {
    pub session: attendance_session::Model,
    /// False when the session had already been closed by someone else.
    pub closed_now: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    #[serde(flatten)]
    pub session: attendance_session::Model,
    pub active: bool,
    pub present_count: u64,
    pub student_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkOutcome {
    pub record: attendance_record::Model,
    pub already_recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub status: AttendanceStatus,
    pub distance_meters: Option<f64>,
    pub marked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub session: SessionView,
    /// The window is over, so ABSENT entries will not change.
    #[serde(rename = "final")]
    pub is_final: bool,
    pub present: usize,
    pub bunk: usize,
    pub absent: usize,
    pub entries: Vec<RosterEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_sessions: usize,
    pub present: usize,
    pub bunk: usize,
    pub absent: usize,
    /// Whole percent; 100 when no session has been held.
    pub rate: u32,
    pub threshold: i32,
    pub below_threshold: bool,
}

impl AttendanceSummary {
    pub fn compute(total_sessions: usize, present: usize, bunk: usize, threshold: i32) -> Self {
        let rate = if total_sessions == 0 {
            100
        } else {
            ((present as f64 / total_sessions as f64) * 100.0).round() as u32
        };
        Self {
            total_sessions,
            present,
            bunk,
            absent: total_sessions.saturating_sub(present + bunk),
            rate,
            threshold,
            below_threshold: (rate as i64) < threshold as i64,
        }
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    db: DatabaseConnection,
    repo: Arc<dyn AttendanceRepository>,
    events: Arc<dyn AttendanceEvents>,
}

impl AttendanceService {
    pub fn new(db: DatabaseConnection, repo: Arc<dyn AttendanceRepository>) -> Self {
        Self {
            db,
            repo,
            events: Arc::new(NoEvents),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn AttendanceEvents>) -> Self {
        self.events = events;
        self
    }

    async fn classroom(&self, classroom_id: i64) -> Result<classroom::Model, ServiceError> {
        classroom::Entity::find_by_id(classroom_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Classroom {classroom_id} not found")))
    }

    pub async fn find_session(
        &self,
        session_id: i64,
    ) -> Result<attendance_session::Model, ServiceError> {
        self.repo
            .find_session(session_id)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Attendance session {session_id} not found"))
            })
    }

    /// Session that must belong to `classroom_id`.
    pub async fn session_in(
        &self,
        classroom_id: i64,
        session_id: i64,
    ) -> Result<attendance_session::Model, ServiceError> {
        let session = self.find_session(session_id).await?;
        if session.classroom_id != classroom_id {
            return Err(ServiceError::not_found(format!(
                "Attendance session {session_id} not found"
            )));
        }
        Ok(session)
    }

    /// Closes a session whose window ran out, if nobody has yet.
    async fn settle(
        &self,
        session: attendance_session::Model,
        now: DateTime<Utc>,
    ) -> Result<attendance_session::Model, ServiceError> {
        if !session.is_stale_at(now) {
            return Ok(session);
        }
        match self
            .repo
            .close_session(session.id, CloseReason::Expired, now)
            .await?
        {
            Some(closed) => {
                tracing::info!(session_id = closed.id, "Attendance session expired");
                self.events.session_closed(&closed).await;
                Ok(closed)
            }
            None => Ok(self.find_session(session.id).await?),
        }
    }

    pub async fn start_session(
        &self,
        classroom_id: i64,
        teacher_id: i64,
        anchor: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<StartedSession, ServiceError> {
        let class = self.classroom(classroom_id).await?;
        if class.teacher_id != teacher_id {
            return Err(ServiceError::forbidden(
                "Only the class teacher can start attendance",
            ));
        }
        let anchor = anchor.ok_or_else(|| {
            ServiceError::Validation("Teacher location is required to start attendance".into())
        })?;
        anchor.validate()?;

        let opened = self
            .repo
            .open_session(NewSession {
                classroom_id,
                started_by: teacher_id,
                start_time: now,
                end_time: attendance_session::Model::window_end(now),
                anchor_lat: anchor.lat,
                anchor_lng: anchor.lng,
            })
            .await?;

        tracing::info!(
            session_id = opened.session.id,
            classroom_id,
            superseded = opened.superseded.len(),
            "Attendance session started"
        );
        for old in &opened.superseded {
            self.events.session_closed(old).await;
        }
        self.events.session_started(&opened.session).await;

        Ok(StartedSession {
            session: SessionView::at(opened.session, now),
            superseded: opened.superseded,
        })
    }

    /// The classroom's session if it is still accepting submissions.
    pub async fn active_session(
        &self,
        classroom_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionView>, ServiceError> {
        let Some(open) = self.repo.open_session_for_classroom(classroom_id).await? else {
            return Ok(None);
        };
        let session = self.settle(open, now).await?;
        Ok(session
            .is_active_at(now)
            .then(|| SessionView::at(session, now)))
    }

    pub async fn get_session(
        &self,
        classroom_id: i64,
        session_id: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionView, ServiceError> {
        let session = self.session_in(classroom_id, session_id).await?;
        let session = self.settle(session, now).await?;
        Ok(SessionView::at(session, now))
    }

    pub async fn close_session(
        &self,
        classroom_id: i64,
        session_id: i64,
        actor_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ClosedSession, ServiceError> {
        let class = self.classroom(classroom_id).await?;
        if class.teacher_id != actor_id {
            return Err(ServiceError::forbidden(
                "Only the class teacher can close attendance",
            ));
        }
        let session = self.session_in(classroom_id, session_id).await?;

        // An elapsed window closes as EXPIRED even when the teacher asks.
        let reason = if session.is_stale_at(now) {
            CloseReason::Expired
        } else {
            CloseReason::Manual
        };

        match self.repo.close_session(session_id, reason, now).await? {
            Some(closed) => {
                tracing::info!(session_id, reason = %reason, "Attendance session closed");
                self.events.session_closed(&closed).await;
                Ok(ClosedSession {
                    session: closed,
                    closed_now: true,
                })
            }
            None => Ok(ClosedSession {
                session: self.find_session(session_id).await?,
                closed_now: false,
            }),
        }
    }

    /// Closes every session whose window has elapsed.
    pub async fn sweep_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<attendance_session::Model>, ServiceError> {
        let closed = self.repo.close_expired(now).await?;
        for session in &closed {
            tracing::debug!(session_id = session.id, "Swept expired attendance session");
            self.events.session_closed(session).await;
        }
        Ok(closed)
    }

    /// Newest first, optionally only those started on `date` (UTC).
    pub async fn list_sessions(
        &self,
        classroom_id: i64,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Vec<SessionSummary>, ServiceError> {
        let class = self.classroom(classroom_id).await?;
        let student_count = classroom::Model::student_count(&self.db, class.id).await?;

        let sessions = self.repo.sessions_for_classroom(classroom_id).await?;
        let mut out = Vec::with_capacity(sessions.len());
        for session in sessions
            .into_iter()
            .filter(|s| date.is_none_or(|d| s.start_time.date_naive() == d))
        {
            let present_count = self.repo.present_count(session.id).await?;
            out.push(SessionSummary {
                active: session.is_active_at(now),
                present_count,
                student_count,
                session,
            });
        }
        Ok(out)
    }

    pub async fn mark_attendance(
        &self,
        session_id: i64,
        student: &user::Model,
        sample: Option<Coordinate>,
        now: DateTime<Utc>,
    ) -> Result<MarkOutcome, ServiceError> {
        let session = self.find_session(session_id).await?;
        let session = self.settle(session, now).await?;
        if !session.is_active_at(now) {
            return Err(ServiceError::SessionClosed);
        }

        if !classroom::Model::is_member(&self.db, session.classroom_id, student.id).await? {
            return Err(ServiceError::forbidden("You are not enrolled in this class"));
        }

        let sample = sample.ok_or(ServiceError::LocationUnavailable)?;
        sample.validate()?;

        let anchor = Coordinate::new(session.anchor_lat, session.anchor_lng);
        let distance = anchor.distance_to(&sample);
        let status = geo::classify(distance);

        let inserted = self
            .repo
            .insert_record_if_absent(NewRecord {
                session_id,
                student_id: student.id,
                student_name: student.name.clone(),
                marked_at: now,
                status,
                distance_meters: distance,
            })
            .await?;

        let already_recorded = !inserted.was_inserted();
        if let RecordInsert::Inserted(record) = &inserted {
            tracing::info!(
                session_id,
                student_id = student.id,
                status = %record.status,
                distance_m = record.distance_meters,
                "Attendance marked"
            );
            self.events.record_marked(&session, record).await;
        } else {
            tracing::debug!(
                session_id,
                student_id = student.id,
                kept = %inserted.record().status,
                "Duplicate submission ignored"
            );
        }

        Ok(MarkOutcome {
            record: inserted.into_record(),
            already_recorded,
        })
    }

    pub async fn records(
        &self,
        session_id: i64,
    ) -> Result<Vec<attendance_record::Model>, ServiceError> {
        Ok(self.repo.records_for_session(session_id).await?)
    }

    pub async fn record_for_student(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<attendance_record::Model>, ServiceError> {
        Ok(self.repo.record_for_student(session_id, student_id).await?)
    }

    /// Every enrolled student with their status; no record means ABSENT.
    pub async fn roster(
        &self,
        classroom_id: i64,
        session_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Roster, ServiceError> {
        let session = self.session_in(classroom_id, session_id).await?;
        let session = self.settle(session, now).await?;

        let students = classroom::Model::students(&self.db, classroom_id).await?;
        let mut by_student: HashMap<i64, attendance_record::Model> = self
            .repo
            .records_for_session(session_id)
            .await?
            .into_iter()
            .map(|r| (r.student_id, r))
            .collect();

        let entries: Vec<RosterEntry> = students
            .into_iter()
            .map(|s| match by_student.remove(&s.id) {
                Some(r) => RosterEntry {
                    student_id: s.id,
                    name: s.name,
                    email: s.email,
                    status: r.status,
                    distance_meters: Some(r.distance_meters),
                    marked_at: Some(r.marked_at),
                },
                None => RosterEntry {
                    student_id: s.id,
                    name: s.name,
                    email: s.email,
                    status: AttendanceStatus::Absent,
                    distance_meters: None,
                    marked_at: None,
                },
            })
            .collect();

        let count = |status: AttendanceStatus| entries.iter().filter(|e| e.status == status).count();
        let (present, bunk, absent) = (
            count(AttendanceStatus::Present),
            count(AttendanceStatus::Bunk),
            count(AttendanceStatus::Absent),
        );

        Ok(Roster {
            is_final: !session.is_active_at(now),
            session: SessionView::at(session, now),
            present,
            bunk,
            absent,
            entries,
        })
    }

    pub async fn attendance_summary(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<AttendanceSummary, ServiceError> {
        let class = self.classroom(classroom_id).await?;
        let total = self.repo.sessions_for_classroom(classroom_id).await?.len();
        let records = self
            .repo
            .records_for_student_in_classroom(classroom_id, student_id)
            .await?;

        let present = records.iter().filter(|r| r.is_present()).count();
        let bunk = records
            .iter()
            .filter(|r| r.status == AttendanceStatus::Bunk)
            .count();

        // An unset (zero) threshold falls back to the default.
        let threshold = if (1..=100).contains(&class.attendance_threshold) {
            class.attendance_threshold
        } else {
            DEFAULT_ATTENDANCE_THRESHOLD
        };
        Ok(AttendanceSummary::compute(total, present, bunk, threshold))
    }
}
