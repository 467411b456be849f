use sea_orm::DbErr;
use thiserror::Error;

/// Message shown when a student submits without a location fix.
pub const LOCATION_UNAVAILABLE_MSG: &str = "Location access needed to mark attendance.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Attendance session is closed")]
    SessionClosed,

    /// The client could not provide a location. Nothing was written and the
    /// student may retry while the window is open.
    #[error("Location access needed to mark attendance.")]
    LocationUnavailable,

    #[error("{0}")]
    InvalidLocation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn forbidden(why: impl Into<String>) -> Self {
        ServiceError::Forbidden(why.into())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ServiceError::Validation(flatten_errors(&errors))
    }
}

/// Flattens field errors into one line, preferring the declared messages.
fn flatten_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
