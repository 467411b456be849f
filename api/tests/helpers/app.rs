use api::auth::generate_jwt;
use api::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use db::models::{
    classroom,
    user::{self, Profile, Role},
};
use db::test_utils::setup_test_db;
use serde_json::Value;
use tower::ServiceExt;
use util::ws::WebSocketManager;

/// Full router over a fresh, migrated in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    let db = setup_test_db().await;
    let state = AppState::new(db, WebSocketManager::new());
    (api::app(state.clone()), state)
}

pub struct Seed {
    pub teacher: user::Model,
    pub teacher_token: String,
    pub student: user::Model,
    pub student_token: String,
    pub outsider: user::Model,
    pub outsider_token: String,
    pub classroom: classroom::Model,
}

fn token(u: &user::Model) -> String {
    generate_jwt(u.id, u.role).unwrap().0
}

/// One teacher owning one class with one enrolled student, plus a student
/// who has not joined.
pub async fn seed(state: &AppState) -> Seed {
    let db = state.db();
    let teacher = user::Model::create(db, "Meera", "meera@uni.edu", Role::Teacher, Profile::default())
        .await
        .unwrap();
    let student = user::Model::create(db, "Arjun", "arjun@uni.edu", Role::Student, Profile::default())
        .await
        .unwrap();
    let outsider = user::Model::create(db, "Kabir", "kabir@uni.edu", Role::Student, Profile::default())
        .await
        .unwrap();
    let class = classroom::Model::create(db, teacher.id, "Data Structures", "4", "Mon 10:00")
        .await
        .unwrap();
    classroom::Model::add_member(db, class.id, student.id)
        .await
        .unwrap();

    Seed {
        teacher_token: token(&teacher),
        student_token: token(&student),
        outsider_token: token(&outsider),
        teacher,
        student,
        outsider,
        classroom: class,
    }
}

/// Sends one request and returns the status with the decoded JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
