//! Defines routes for the meetup resource.
//!
//! ## Structure
//! - **Meetup endpoints**
//!   - `GET    /meetups`      : list, supports `?date=YYYY-MM-DD&page=N`
//!   - `GET    /meetups/mine` : the caller's meetups (`?page=N`)
//!   - `POST   /meetups`      : create
//!   - `GET    /meetups/{id}` : detail
//!   - `PUT    /meetups/{id}` : partial update
//!   - `DELETE /meetups/{id}` : delete
//!
//! - **Operational endpoints**
//!   - `GET /healthz`, `GET /readyz`
//!
//! Handlers that act for a user read the caller from the `x-user-id` header.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        meetup_handlers::{
            create_meetup, delete_meetup, get_meetup, list_meetups, list_my_meetups,
            update_meetup,
        },
    },
    services::meetup_service::MeetupService,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build and return the router for all routes.
///
/// The router carries shared state (`MeetupService`) to all handlers and logs
/// every request through `TraceLayer`.
pub fn routes() -> Router<MeetupService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // `/meetups/mine` is static and wins over `/meetups/{id}`
        .route("/meetups", get(list_meetups).post(create_meetup))
        .route("/meetups/mine", get(list_my_meetups))
        .route(
            "/meetups/{id}",
            get(get_meetup).put(update_meetup).delete(delete_meetup),
        )
        .layer(TraceLayer::new_for_http())
}
