use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::meetup_service::MeetupError;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<MeetupError> for AppError {
    fn from(err: MeetupError) -> Self {
        match err {
            MeetupError::Validation => AppError::bad_request("invalid information"),
            MeetupError::InvalidDate(raw) => {
                tracing::debug!(date = %raw, "unparseable date filter");
                AppError::bad_request("invalid date")
            }
            MeetupError::PastDate => AppError::bad_request("past dates are not permitted"),
            MeetupError::BannerNotFound(_) => AppError::bad_request("banner not found"),
            MeetupError::NotOwned { meetup, caller } => {
                tracing::debug!(%meetup, %caller, "update of missing or foreign meetup");
                AppError::bad_request("meetup not found")
            }
            MeetupError::PastMeetupEdit(_) => AppError::bad_request("cannot edit past meetup"),
            MeetupError::PastMeetupDelete(_) => {
                AppError::bad_request("cannot delete past meetups")
            }
            MeetupError::UnknownUser(id) => {
                tracing::warn!(user = %id, "caller has no user record");
                AppError::unauthorized("unknown user")
            }
            MeetupError::Unauthorized { meetup, caller } => {
                tracing::warn!(%meetup, %caller, "delete of foreign meetup refused");
                AppError::unauthorized("not authorized")
            }
            MeetupError::NotFound(_) => AppError::not_found("meetup not found"),
            MeetupError::Sqlx(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::internal("internal error")
            }
        }
    }
}
