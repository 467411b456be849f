use db::models::user::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    #[inline]
    pub fn id(&self) -> i64 {
        self.0.sub
    }

    #[inline]
    pub fn is_teacher(&self) -> bool {
        self.0.role == Role::Teacher
    }

    #[inline]
    pub fn is_student(&self) -> bool {
        self.0.role == Role::Student
    }
}
