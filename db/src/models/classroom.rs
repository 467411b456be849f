use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, sea_query::OnConflict};
use serde::{Deserialize, Serialize};

use super::{classroom_member, user};

/// Attendance percentage a student must keep unless the teacher overrides it.
pub const DEFAULT_ATTENDANCE_THRESHOLD: i32 = 75;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classrooms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub teacher_id: i64,
    pub semester: String,
    pub schedule: String,
    /// Minimum attendance percentage (0..=100).
    pub attendance_threshold: i32,
    pub next_class_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::TeacherId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
    #[sea_orm(has_many = "super::classroom_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::attendance_session::Entity")]
    AttendanceSessions,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::classroom_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::attendance_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassroomChanges {
    pub name: Option<String>,
    pub semester: Option<String>,
    pub schedule: Option<String>,
    pub attendance_threshold: Option<i32>,
    /// `Some(None)` clears the next class time.
    pub next_class_time: Option<Option<DateTime<Utc>>>,
}

impl Model {
    pub async fn create(
        db: &DbConn,
        teacher_id: i64,
        name: &str,
        semester: &str,
        schedule: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let classroom = ActiveModel {
            name: Set(name.trim().to_owned()),
            teacher_id: Set(teacher_id),
            semester: Set(semester.trim().to_owned()),
            schedule: Set(schedule.trim().to_owned()),
            attendance_threshold: Set(DEFAULT_ATTENDANCE_THRESHOLD),
            next_class_time: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        classroom.insert(db).await
    }

    pub async fn update(db: &DbConn, id: i64, changes: ClassroomChanges) -> Result<Model, DbErr> {
        let mut classroom = ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Some(name) = changes.name.filter(|n| !n.trim().is_empty()) {
            classroom.name = Set(name.trim().to_owned());
        }
        if let Some(semester) = changes.semester {
            classroom.semester = Set(semester.trim().to_owned());
        }
        if let Some(schedule) = changes.schedule {
            classroom.schedule = Set(schedule.trim().to_owned());
        }
        if let Some(threshold) = changes.attendance_threshold {
            classroom.attendance_threshold = Set(threshold.clamp(0, 100));
        }
        if let Some(next) = changes.next_class_time {
            classroom.next_class_time = Set(next);
        }

        classroom.update(db).await
    }

    pub async fn list_for_teacher(db: &DbConn, teacher_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    pub async fn list_for_student(db: &DbConn, student_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .inner_join(classroom_member::Entity)
            .filter(classroom_member::Column::UserId.eq(student_id))
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Adds a student to the roster. Joining twice is a no-op.
    pub async fn add_member(db: &DbConn, classroom_id: i64, user_id: i64) -> Result<(), DbErr> {
        let member = classroom_member::ActiveModel {
            classroom_id: Set(classroom_id),
            user_id: Set(user_id),
            joined_at: Set(Utc::now()),
        };
        classroom_member::Entity::insert(member)
            .on_conflict(
                OnConflict::columns([
                    classroom_member::Column::ClassroomId,
                    classroom_member::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn is_member(db: &DbConn, classroom_id: i64, user_id: i64) -> Result<bool, DbErr> {
        let found = classroom_member::Entity::find_by_id((classroom_id, user_id))
            .one(db)
            .await?;
        Ok(found.is_some())
    }

    /// Enrolled students, ordered by name.
    pub async fn students(db: &DbConn, classroom_id: i64) -> Result<Vec<user::Model>, DbErr> {
        user::Entity::find()
            .inner_join(classroom_member::Entity)
            .filter(classroom_member::Column::ClassroomId.eq(classroom_id))
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
    }

    pub async fn student_count(db: &DbConn, classroom_id: i64) -> Result<u64, DbErr> {
        classroom_member::Entity::find()
            .filter(classroom_member::Column::ClassroomId.eq(classroom_id))
            .count(db)
            .await
    }

    /// True when the next class starts within the coming hour.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_class_time {
            Some(next) => {
                let until = next - now;
                until > Duration::zero() && until <= Duration::hours(1)
            }
            None => false,
        }
    }
}
