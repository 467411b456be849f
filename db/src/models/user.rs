use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A registered person. Identity is the email address alone.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: Role,
    pub mobile: Option<String>,
    pub course: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account-wide role chosen at registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "TEACHER")]
    Teacher,
    #[sea_orm(string_value = "STUDENT")]
    Student,
}

/// Optional student profile fields captured at registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub mobile: Option<String>,
    pub course: Option<String>,
    pub branch: Option<String>,
    pub semester: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::classroom::Entity")]
    Classrooms,
    #[sea_orm(has_many = "super::classroom_member::Entity")]
    Memberships,
}

impl Related<super::classroom::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Classrooms.def()
    }
}

impl Related<super::classroom_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        email: &str,
        role: Role,
        profile: Profile,
    ) -> Result<Model, DbErr> {
        let user = ActiveModel {
            name: Set(name.trim().to_owned()),
            email: Set(normalize_email(email)),
            role: Set(role),
            mobile: Set(profile.mobile),
            course: Set(profile.course),
            branch: Set(profile.branch),
            semester: Set(profile.semester),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        user.insert(db).await
    }

    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(normalize_email(email)))
            .one(db)
            .await
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }
}

/// Emails are matched case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
