use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

use super::{AttendanceRepository, NewRecord, NewSession, OpenedSession, RecordInsert};
use crate::models::attendance_record::{self, AttendanceStatus};
use crate::models::attendance_session::{self, CloseReason, SessionState};

/// [`AttendanceRepository`] over a sea-orm connection.
#[derive(Clone)]
pub struct SeaOrmAttendanceRepository {
    db: DatabaseConnection,
}

impl SeaOrmAttendanceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn closing(reason: CloseReason, at: DateTime<Utc>) -> attendance_session::ActiveModel {
        attendance_session::ActiveModel {
            state: Set(SessionState::Closed),
            close_reason: Set(Some(reason)),
            closed_at: Set(Some(at)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AttendanceRepository for SeaOrmAttendanceRepository {
    async fn open_session(&self, new: NewSession) -> Result<OpenedSession, DbErr> {
        let txn = self.db.begin().await?;

        let prior = attendance_session::Entity::find()
            .filter(attendance_session::Column::ClassroomId.eq(new.classroom_id))
            .filter(attendance_session::Column::State.eq(SessionState::Open))
            .all(&txn)
            .await?;

        let mut superseded = Vec::with_capacity(prior.len());
        for session in prior {
            let res = attendance_session::Entity::update_many()
                .set(Self::closing(CloseReason::Superseded, new.start_time))
                .filter(attendance_session::Column::Id.eq(session.id))
                .filter(attendance_session::Column::State.eq(SessionState::Open))
                .exec(&txn)
                .await?;
            if res.rows_affected == 1 {
                superseded.push(attendance_session::Model {
                    state: SessionState::Closed,
                    close_reason: Some(CloseReason::Superseded),
                    closed_at: Some(new.start_time),
                    ..session
                });
            }
        }

        let session = attendance_session::ActiveModel {
            classroom_id: Set(new.classroom_id),
            started_by: Set(new.started_by),
            start_time: Set(new.start_time),
            end_time: Set(new.end_time),
            state: Set(SessionState::Open),
            close_reason: Set(None),
            closed_at: Set(None),
            anchor_lat: Set(new.anchor_lat),
            anchor_lng: Set(new.anchor_lng),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(OpenedSession {
            session,
            superseded,
        })
    }

    async fn find_session(&self, id: i64) -> Result<Option<attendance_session::Model>, DbErr> {
        attendance_session::Entity::find_by_id(id).one(&self.db).await
    }

    async fn open_session_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Option<attendance_session::Model>, DbErr> {
        attendance_session::Entity::find()
            .filter(attendance_session::Column::ClassroomId.eq(classroom_id))
            .filter(attendance_session::Column::State.eq(SessionState::Open))
            .order_by_desc(attendance_session::Column::Id)
            .one(&self.db)
            .await
    }

    async fn sessions_for_classroom(
        &self,
        classroom_id: i64,
    ) -> Result<Vec<attendance_session::Model>, DbErr> {
        attendance_session::Entity::find()
            .filter(attendance_session::Column::ClassroomId.eq(classroom_id))
            .order_by_desc(attendance_session::Column::Id)
            .all(&self.db)
            .await
    }

    async fn close_session(
        &self,
        id: i64,
        reason: CloseReason,
        at: DateTime<Utc>,
    ) -> Result<Option<attendance_session::Model>, DbErr> {
        let res = attendance_session::Entity::update_many()
            .set(Self::closing(reason, at))
            .filter(attendance_session::Column::Id.eq(id))
            .filter(attendance_session::Column::State.eq(SessionState::Open))
            .exec(&self.db)
            .await?;

        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.find_session(id).await
    }

    async fn close_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<attendance_session::Model>, DbErr> {
        // Timestamps are stored as text, so the end-time check happens here.
        let open = attendance_session::Entity::find()
            .filter(attendance_session::Column::State.eq(SessionState::Open))
            .all(&self.db)
            .await?;

        let mut closed = Vec::new();
        for session in open.into_iter().filter(|s| s.is_stale_at(now)) {
            if let Some(s) = self.close_session(session.id, CloseReason::Expired, now).await? {
                closed.push(s);
            }
        }
        Ok(closed)
    }

    async fn insert_record_if_absent(&self, new: NewRecord) -> Result<RecordInsert, DbErr> {
        let (session_id, student_id) = (new.session_id, new.student_id);
        let record = attendance_record::ActiveModel {
            session_id: Set(new.session_id),
            student_id: Set(new.student_id),
            student_name: Set(new.student_name),
            marked_at: Set(new.marked_at),
            status: Set(new.status),
            distance_meters: Set(new.distance_meters),
            ..Default::default()
        };

        let inserted = attendance_record::Entity::insert(record)
            .on_conflict(
                OnConflict::columns([
                    attendance_record::Column::SessionId,
                    attendance_record::Column::StudentId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let stored = self
            .record_for_student(session_id, student_id)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!(
                    "Attendance record for session {session_id}, student {student_id}"
                ))
            })?;

        Ok(if inserted == 1 {
            RecordInsert::Inserted(stored)
        } else {
            RecordInsert::Existing(stored)
        })
    }

    async fn records_for_session(
        &self,
        session_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr> {
        attendance_record::Entity::find()
            .filter(attendance_record::Column::SessionId.eq(session_id))
            .order_by_asc(attendance_record::Column::Id)
            .all(&self.db)
            .await
    }

    async fn record_for_student(
        &self,
        session_id: i64,
        student_id: i64,
    ) -> Result<Option<attendance_record::Model>, DbErr> {
        attendance_record::Entity::find()
            .filter(attendance_record::Column::SessionId.eq(session_id))
            .filter(attendance_record::Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
    }

    async fn present_count(&self, session_id: i64) -> Result<u64, DbErr> {
        attendance_record::Entity::find()
            .filter(attendance_record::Column::SessionId.eq(session_id))
            .filter(attendance_record::Column::Status.eq(AttendanceStatus::Present))
            .count(&self.db)
            .await
    }

    async fn records_for_student_in_classroom(
        &self,
        classroom_id: i64,
        student_id: i64,
    ) -> Result<Vec<attendance_record::Model>, DbErr> {
        attendance_record::Entity::find()
            .join(
                JoinType::InnerJoin,
                attendance_record::Relation::Session.def(),
            )
            .filter(attendance_session::Column::ClassroomId.eq(classroom_id))
            .filter(attendance_record::Column::StudentId.eq(student_id))
            .order_by_asc(attendance_record::Column::Id)
            .all(&self.db)
            .await
    }
}
