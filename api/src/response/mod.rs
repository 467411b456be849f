use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::ServiceError;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// Error responses carry `data: {}` (or the type's default) and
/// `success: false`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Serializes as `{}` in error responses.
#[derive(Serialize, Default)]
pub struct Empty {}

/// HTTP status for each service failure.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ServiceError::SessionClosed => StatusCode::CONFLICT,
        ServiceError::LocationUnavailable => StatusCode::BAD_REQUEST,
        ServiceError::InvalidLocation(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

/// Converts a service failure into the standard error envelope.
///
/// Database details are logged, not returned.
pub fn error_response(err: ServiceError) -> Response {
    let status = status_for(&err);
    let message = match &err {
        ServiceError::Database(e) => {
            tracing::error!(error = %e, "Database error while handling request");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}

/// `200`/`201` with the success envelope.
pub fn ok<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> Response {
    (status, Json(ApiResponse::success(data, message))).into_response()
}
