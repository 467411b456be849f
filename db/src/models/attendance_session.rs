use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How long a session accepts submissions after it is started.
pub const SESSION_WINDOW_SECS: i64 = 60;

/// A timed, geofenced check-in window for one classroom.
///
/// `anchor_lat`/`anchor_lng` are captured from the teacher when the session is
/// started and every submission is measured against them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub classroom_id: i64,
    pub started_by: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub state: SessionState,
    pub close_reason: Option<CloseReason>,
    pub closed_at: Option<DateTime<Utc>>,
    pub anchor_lat: f64,
    pub anchor_lng: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CloseReason {
    /// The window ran out.
    #[sea_orm(string_value = "expired")]
    Expired,
    /// A newer session was started for the same classroom.
    #[sea_orm(string_value = "superseded")]
    Superseded,
    /// The teacher ended it early.
    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classroom::Entity",
        from = "Column::ClassroomId",
        to = "super::classroom::Column::Id",
        on_delete = "Cascade"
    )]
    Classroom,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    Records,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classroom.def()
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// End of the window for a session started at `start`.
    pub fn window_end(start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::seconds(SESSION_WINDOW_SECS)
    }

    /// Open and not yet past its end time.
    #[inline]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.state == SessionState::Open && now < self.end_time
    }

    /// Open in storage although the window has already run out.
    #[inline]
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        self.state == SessionState::Open && now >= self.end_time
    }

    /// Whole seconds left in the window, rounded up, never negative.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let ms = (self.end_time - now).num_milliseconds();
        if ms <= 0 { 0 } else { (ms + 999) / 1000 }
    }
}
