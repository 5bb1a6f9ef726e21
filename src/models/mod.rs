//! Core data models for the meetup service.
//!
//! Stored entities map to SQLite tables via `sqlx::FromRow`; the response
//! views in [`meetup`] shape them into the JSON each endpoint returns.

pub mod file;
pub mod meetup;
pub mod user;
