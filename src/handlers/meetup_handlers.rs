//! HTTP handlers for the meetup resource.
//! Each handler extracts the request pieces, turns extractor rejections into
//! the service's JSON errors and delegates to `MeetupService`.

use crate::{
    auth::CallerId,
    errors::AppError,
    models::meetup::{MeetupDetail, MeetupUpdated, MeetupWithBanner, MeetupWithOwner},
    services::meetup_service::{CreateMeetupRequest, MeetupService, UpdateMeetupRequest},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, de::Error as _};
use tracing::debug;
use uuid::Uuid;

/// Query params of `GET /meetups`.
#[derive(Debug, Deserialize)]
pub struct ListMeetupsQuery {
    /// Calendar day, `YYYY-MM-DD` (UTC).
    pub date: Option<String>,
    /// 1-based page number.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
}

/// Query params of `GET /meetups/mine`.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<u32>,
}

/// `page=` with no value means the first page.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

/// GET `/meetups`: all meetups, optionally for one day, 10 per page.
pub async fn list_meetups(
    State(service): State<MeetupService>,
    query: Result<Query<ListMeetupsQuery>, QueryRejection>,
) -> Result<Json<Vec<MeetupWithOwner>>, AppError> {
    let Query(q) = query.map_err(invalid_information)?;
    let meetups = service.list(q.date.as_deref(), q.page).await?;
    Ok(Json(meetups))
}

/// GET `/meetups/mine`: the caller's meetups by date, with banners.
pub async fn list_my_meetups(
    State(service): State<MeetupService>,
    CallerId(caller): CallerId,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Vec<MeetupWithBanner>>, AppError> {
    let Query(q) = query.map_err(invalid_information)?;
    let meetups = service.list_mine(caller, q.page).await?;
    Ok(Json(meetups))
}

/// GET `/meetups/{id}`
pub async fn get_meetup(
    State(service): State<MeetupService>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MeetupDetail>, AppError> {
    let id = meetup_id(id)?;
    Ok(Json(service.detail(id).await?))
}

/// POST `/meetups`
pub async fn create_meetup(
    State(service): State<MeetupService>,
    CallerId(caller): CallerId,
    payload: Result<Json<CreateMeetupRequest>, JsonRejection>,
) -> Result<Json<MeetupWithBanner>, AppError> {
    let Json(req) = payload.map_err(invalid_information)?;
    Ok(Json(service.create(caller, req).await?))
}

/// PUT `/meetups/{id}`: partial update of an upcoming meetup.
pub async fn update_meetup(
    State(service): State<MeetupService>,
    CallerId(caller): CallerId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateMeetupRequest>, JsonRejection>,
) -> Result<Json<MeetupUpdated>, AppError> {
    let id = meetup_id(id)?;
    let Json(req) = payload.map_err(invalid_information)?;
    Ok(Json(service.update(caller, id, req).await?))
}

/// DELETE `/meetups/{id}`: answers 200 with an empty body.
pub async fn delete_meetup(
    State(service): State<MeetupService>,
    CallerId(caller): CallerId,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = meetup_id(id)?;
    service.delete(caller, id).await?;
    Ok(StatusCode::OK)
}

fn meetup_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    id.map(|Path(id)| id).map_err(|rejection| {
        debug!(%rejection, "bad meetup id");
        AppError::bad_request("invalid meetup id")
    })
}

fn invalid_information(rejection: impl std::fmt::Display) -> AppError {
    debug!(%rejection, "rejected request input");
    AppError::bad_request("invalid information")
}
