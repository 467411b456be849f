use db::models::user::{self, Profile, Role};
use sea_orm::DatabaseConnection;

pub async fn teacher(db: &DatabaseConnection, email: &str) -> user::Model {
    user::Model::create(db, "Teacher", email, Role::Teacher, Profile::default())
        .await
        .unwrap()
}

pub async fn student(db: &DatabaseConnection, email: &str) -> user::Model {
    user::Model::create(db, "Student", email, Role::Student, Profile::default())
        .await
        .unwrap()
}
