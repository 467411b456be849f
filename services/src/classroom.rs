use chrono::{DateTime, Utc};
use db::models::classroom::{self, ClassroomChanges};
use db::models::user::{self, Role};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClassroom {
    #[validate(length(min = 1, max = 120, message = "Class name is required"))]
    pub name: String,
    #[serde(default)]
    pub semester: String,
    #[serde(default)]
    pub schedule: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateClassroom {
    #[validate(length(min = 1, max = 120, message = "Class name cannot be empty"))]
    pub name: Option<String>,
    pub semester: Option<String>,
    pub schedule: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Threshold must be between 0 and 100"))]
    pub attendance_threshold: Option<i32>,
    #[serde(default, with = "double_option")]
    pub next_class_time: Option<Option<DateTime<Utc>>>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

/// A classroom as seen by one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct ClassroomView {
    #[serde(flatten)]
    pub classroom: classroom::Model,
    pub student_count: u64,
    pub reminder_due: bool,
}

#[derive(Clone)]
pub struct ClassroomService {
    db: DatabaseConnection,
}

impl ClassroomService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        teacher: &user::Model,
        params: CreateClassroom,
    ) -> Result<classroom::Model, ServiceError> {
        if !teacher.is_teacher() {
            return Err(ServiceError::forbidden("Only teachers can create classes"));
        }
        params.validate()?;
        if params.name.trim().is_empty() {
            return Err(ServiceError::Validation("Class name is required".into()));
        }

        let created = classroom::Model::create(
            &self.db,
            teacher.id,
            &params.name,
            &params.semester,
            &params.schedule,
        )
        .await?;
        tracing::info!(classroom_id = created.id, teacher_id = teacher.id, "Created classroom");
        Ok(created)
    }

    pub async fn update(
        &self,
        classroom_id: i64,
        actor_id: i64,
        params: UpdateClassroom,
    ) -> Result<classroom::Model, ServiceError> {
        params.validate()?;
        let existing = self.get(classroom_id).await?;
        if existing.teacher_id != actor_id {
            return Err(ServiceError::forbidden("Only the class teacher can edit it"));
        }

        let changes = ClassroomChanges {
            name: params.name,
            semester: params.semester,
            schedule: params.schedule,
            attendance_threshold: params.attendance_threshold,
            next_class_time: params.next_class_time,
        };
        Ok(classroom::Model::update(&self.db, classroom_id, changes).await?)
    }

    pub async fn get(&self, classroom_id: i64) -> Result<classroom::Model, ServiceError> {
        classroom::Entity::find_by_id(classroom_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Classroom {classroom_id} not found")))
    }

    pub async fn view(
        &self,
        classroom: classroom::Model,
        now: DateTime<Utc>,
    ) -> Result<ClassroomView, ServiceError> {
        let student_count = classroom::Model::student_count(&self.db, classroom.id).await?;
        let reminder_due = classroom.reminder_due(now);
        Ok(ClassroomView {
            classroom,
            student_count,
            reminder_due,
        })
    }

    /// Classes the user teaches or has joined, depending on their role.
    pub async fn list_for(
        &self,
        viewer: &user::Model,
        now: DateTime<Utc>,
    ) -> Result<Vec<ClassroomView>, ServiceError> {
        let classes = match viewer.role {
            Role::Teacher => classroom::Model::list_for_teacher(&self.db, viewer.id).await?,
            Role::Student => classroom::Model::list_for_student(&self.db, viewer.id).await?,
        };

        let mut views = Vec::with_capacity(classes.len());
        for c in classes {
            views.push(self.view(c, now).await?);
        }
        Ok(views)
    }

    pub async fn join(
        &self,
        classroom_id: i64,
        student: &user::Model,
    ) -> Result<classroom::Model, ServiceError> {
        if student.role != Role::Student {
            return Err(ServiceError::forbidden("Only students can join classes"));
        }
        let class = self.get(classroom_id).await?;
        classroom::Model::add_member(&self.db, class.id, student.id).await?;
        tracing::info!(classroom_id, student_id = student.id, "Student joined classroom");
        Ok(class)
    }

    /// Teacher of the class or an enrolled student.
    pub async fn can_view(&self, classroom: &classroom::Model, user_id: i64) -> Result<bool, ServiceError> {
        if classroom.teacher_id == user_id {
            return Ok(true);
        }
        Ok(classroom::Model::is_member(&self.db, classroom.id, user_id).await?)
    }
}
