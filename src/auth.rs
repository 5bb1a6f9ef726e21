//! Caller identity.
//!
//! Authentication happens upstream: the gateway verifies the session and
//! forwards the user id in the `x-user-id` header. Handlers that act on
//! behalf of a user take a [`CallerId`] argument.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;

pub const CALLER_HEADER: &str = "x-user-id";

/// Authenticated user id of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(CALLER_HEADER) else {
            return Err(AppError::unauthorized("token not provided"));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(CallerId)
            .ok_or_else(|| AppError::unauthorized("invalid token"))
    }
}
