//! Service error types with HTTP status code mapping.
//!
//! [`QuizError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "room not found: QX7HC",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`QuizError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                     |
/// |-----------|------------------|---------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request                 |
/// | 2000–2999 | Room state       | 404 Not Found / 409 Conflict    |
/// | 3000–3999 | Server           | 500 / 503                       |
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// A required join parameter (`room` or `username`) was absent.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No room exists under the given code.
    #[error("room not found: {0}")]
    RoomNotFound(String),

    /// The username is already a member of the room.
    #[error("username {username:?} already taken in room {room}")]
    UsernameTaken {
        /// Room the join targeted.
        room: String,
        /// Colliding username.
        username: String,
    },

    /// The shared room store could not be reached or answered with an error.
    #[error("room store unavailable: {0}")]
    BackendUnavailable(String),

    /// A read or write on an active session failed.
    #[error("connection terminated: {0}")]
    ConnectionTerminal(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QuizError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MissingParameter(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::RoomNotFound(_) => 2001,
            Self::UsernameTaken { .. } => 2002,
            Self::Internal(_) => 3000,
            Self::BackendUnavailable(_) => 3001,
            Self::ConnectionTerminal(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::UsernameTaken { .. } => StatusCode::CONFLICT,
            Self::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ConnectionTerminal(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<redis::RedisError> for QuizError {
    fn from(err: redis::RedisError) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}

impl From<axum::Error> for QuizError {
    fn from(err: axum::Error) -> Self {
        Self::ConnectionTerminal(err.to_string())
    }
}

impl IntoResponse for QuizError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
