use db::repository::{AttendanceRepository, SeaOrmAttendanceRepository};
use sea_orm::DatabaseConnection;
use services::attendance::AttendanceService;
use services::classroom::ClassroomService;
use services::user::UserService;
use std::sync::Arc;
use util::ws::WebSocketManager;

use crate::ws::attendance::emit::WsAttendanceEvents;

/// Shared handles passed to every route, guard and background task.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
    attendance: AttendanceService,
    classrooms: ClassroomService,
    users: UserService,
}

impl AppState {
    /// State backed entirely by `db`.
    pub fn new(db: DatabaseConnection, ws: WebSocketManager) -> Self {
        let repo = Arc::new(SeaOrmAttendanceRepository::new(db.clone()));
        Self::with_repository(db, ws, repo)
    }

    /// Same as [`AppState::new`] with a caller-chosen attendance store.
    pub fn with_repository(
        db: DatabaseConnection,
        ws: WebSocketManager,
        repo: Arc<dyn AttendanceRepository>,
    ) -> Self {
        let events = Arc::new(WsAttendanceEvents::new(ws.clone()));
        Self {
            attendance: AttendanceService::new(db.clone(), repo).with_events(events),
            classrooms: ClassroomService::new(db.clone()),
            users: UserService::new(db.clone()),
            db,
            ws,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    pub fn classrooms(&self) -> &ClassroomService {
        &self.classrooms
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }
}
