//! Email-only identity.

use db::models::user::{self, Profile, Role};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use validator::Validate;

use crate::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn register(&self, params: RegisterUser) -> Result<user::Model, ServiceError> {
        let params = RegisterUser {
            name: params.name.trim().to_owned(),
            email: user::normalize_email(&params.email),
            ..params
        };
        params.validate()?;

        if user::Model::find_by_email(&self.db, &params.email)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "A user with this email already exists".into(),
            ));
        }

        let created =
            user::Model::create(&self.db, &params.name, &params.email, params.role, params.profile)
                .await?;
        tracing::info!(user_id = created.id, role = %created.role, "Registered user");
        Ok(created)
    }

    pub async fn login(&self, email: &str) -> Result<user::Model, ServiceError> {
        user::Model::find_by_email(&self.db, email)
            .await?
            .ok_or_else(|| ServiceError::not_found("No account exists for this email"))
    }

    pub async fn get(&self, id: i64) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User {id} not found")))
    }
}
