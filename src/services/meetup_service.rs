//! src/services/meetup_service.rs
//!
//! MeetupService: the meetup resource backed by SQLite. Handlers translate
//! HTTP input into calls here; this file owns validation, the date rules
//! (no past dates, no edits after the meetup started) and ownership checks.

use crate::models::meetup::{
    Meetup, MeetupBannerRow, MeetupDetail, MeetupOwnerRow, MeetupUpdated, MeetupWithBanner,
    MeetupWithOwner,
};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Fixed page size for every listing.
pub const PAGE_SIZE: i64 = 10;

const MEETUP_COLUMNS: &str = "m.id, m.title, m.description, m.location, m.date, m.banner_id, \
     m.owner_id, m.created_at, m.updated_at";

/// Body of `POST /meetups`.
///
/// Every field is optional at the serde level so that a missing field ends up
/// as the same validation error as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct CreateMeetupRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "banner", alias = "file_id")]
    pub banner_id: Option<Uuid>,
}

/// Body of `PUT /meetups/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMeetupRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    /// `None` keeps the banner, `Some(None)` clears it.
    #[serde(
        default,
        alias = "banner",
        alias = "file_id",
        deserialize_with = "double_option"
    )]
    pub banner_id: Option<Option<Uuid>>,
}

#[derive(Debug, Error)]
pub enum MeetupError {
    #[error("invalid information")]
    Validation,
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("past dates are not permitted")]
    PastDate,
    #[error("banner `{0}` not found")]
    BannerNotFound(Uuid),
    #[error("user `{0}` not found")]
    UnknownUser(Uuid),
    #[error("meetup `{0}` not found")]
    NotFound(Uuid),
    #[error("meetup `{meetup}` not found for user `{caller}`")]
    NotOwned { meetup: Uuid, caller: Uuid },
    #[error("user `{caller}` does not own meetup `{meetup}`")]
    Unauthorized { meetup: Uuid, caller: Uuid },
    #[error("meetup `{0}` already happened and cannot be edited")]
    PastMeetupEdit(Uuid),
    #[error("meetup `{0}` already happened and cannot be deleted")]
    PastMeetupDelete(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type MeetupResult<T> = Result<T, MeetupError>;

/// Validated create payload.
#[derive(Debug)]
struct NewMeetup {
    title: String,
    description: String,
    location: String,
    date: DateTime<Utc>,
    banner_id: Option<Uuid>,
}

/// Validated update payload.
#[derive(Debug, Default)]
struct MeetupChanges {
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    date: Option<DateTime<Utc>>,
    banner_id: Option<Option<Uuid>>,
}

impl MeetupChanges {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.date.is_none()
            && self.banner_id.is_none()
    }
}

/// MeetupService provides the meetup resource operations:
/// - list / list_mine: paginated listings with owner or banner embedded
/// - detail: a single meetup with banner metadata
/// - create / update / delete: validated writes guarded by the date and
///   ownership rules
///
/// It is built once at startup and cloned into every request; clones share
/// the same pool.
#[derive(Clone)]
pub struct MeetupService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    /// Public root under which the file service serves banners.
    pub files_url: String,
}

impl MeetupService {
    pub fn new(db: Arc<SqlitePool>, files_url: impl Into<String>) -> Self {
        Self {
            db,
            files_url: files_url.into(),
        }
    }

    /// List meetups, optionally restricted to one UTC calendar day.
    ///
    /// Ordered by date, then id, so pages are stable for a fixed data set.
    pub async fn list(
        &self,
        date: Option<&str>,
        page: Option<u32>,
    ) -> MeetupResult<Vec<MeetupWithOwner>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {MEETUP_COLUMNS}, u.name AS owner_name, u.email AS owner_email \
             FROM meetups m LEFT JOIN users u ON u.id = m.owner_id"
        ));

        if let Some(raw) = date.filter(|raw| !raw.trim().is_empty()) {
            let day = parse_day(raw).ok_or_else(|| MeetupError::InvalidDate(raw.to_string()))?;
            let (start, end) =
                day_bounds(day).ok_or_else(|| MeetupError::InvalidDate(raw.to_string()))?;
            debug!(%start, %end, "filtering meetups by day");
            builder.push(" WHERE m.date >= ");
            builder.push_bind(start);
            builder.push(" AND m.date < ");
            builder.push_bind(end);
        }

        builder.push(" ORDER BY m.date ASC, m.id ASC LIMIT ");
        builder.push_bind(PAGE_SIZE);
        builder.push(" OFFSET ");
        builder.push_bind(page_offset(page));

        let rows: Vec<MeetupOwnerRow> = builder.build_query_as().fetch_all(&*self.db).await?;
        Ok(rows.into_iter().map(MeetupWithOwner::from).collect())
    }

    /// List the caller's own meetups by date, with banners attached.
    pub async fn list_mine(
        &self,
        caller: Uuid,
        page: Option<u32>,
    ) -> MeetupResult<Vec<MeetupWithBanner>> {
        let rows = sqlx::query_as::<_, MeetupBannerRow>(&format!(
            "SELECT {MEETUP_COLUMNS}, f.name AS file_name, f.path AS file_path
             FROM meetups m LEFT JOIN files f ON f.id = m.banner_id
             WHERE m.owner_id = ?
             ORDER BY m.date ASC, m.id ASC
             LIMIT ? OFFSET ?"
        ))
        .bind(caller)
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MeetupWithBanner::from_row(row, &self.files_url))
            .collect())
    }

    /// Fetch one meetup with its banner metadata.
    pub async fn detail(&self, id: Uuid) -> MeetupResult<MeetupDetail> {
        let row = self
            .fetch_with_banner(id)
            .await?
            .ok_or(MeetupError::NotFound(id))?;
        Ok(MeetupDetail::from_row(row, &self.files_url))
    }

    /// Create a meetup owned by `caller`.
    ///
    /// The date is truncated to the start of its hour before the past check,
    /// so a meetup later within the current hour is still rejected.
    pub async fn create(
        &self,
        caller: Uuid,
        req: CreateMeetupRequest,
    ) -> MeetupResult<MeetupWithBanner> {
        let new = validate_create(req)?;
        let now = Utc::now();
        let date = upcoming_hour(new.date, now)?;

        self.ensure_user_exists(caller).await?;
        if let Some(banner_id) = new.banner_id {
            self.ensure_banner_exists(banner_id).await?;
        }

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO meetups (
                id, title, description, location, date, banner_id, owner_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.location)
        .bind(date)
        .bind(new.banner_id)
        .bind(caller)
        .bind(now)
        .bind(now)
        .execute(&*self.db)
        .await?;

        debug!(%id, owner = %caller, "created meetup");

        let row = self
            .fetch_with_banner(id)
            .await?
            .ok_or(MeetupError::NotFound(id))?;
        Ok(MeetupWithBanner::from_row(row, &self.files_url))
    }

    /// Apply a partial update to one of the caller's upcoming meetups.
    ///
    /// Only supplied fields are written; the owner is never touched.
    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        req: UpdateMeetupRequest,
    ) -> MeetupResult<MeetupUpdated> {
        let meetup = sqlx::query_as::<_, Meetup>(&format!(
            "SELECT {MEETUP_COLUMNS} FROM meetups m WHERE m.id = ? AND m.owner_id = ?"
        ))
        .bind(id)
        .bind(caller)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(MeetupError::NotOwned {
            meetup: id,
            caller,
        })?;

        let now = Utc::now();
        if meetup.is_past_at(now) {
            return Err(MeetupError::PastMeetupEdit(id));
        }

        let mut changes = validate_update(req)?;
        changes.date = changes
            .date
            .map(|date| upcoming_hour(date, now))
            .transpose()?;
        if let Some(Some(banner_id)) = changes.banner_id {
            self.ensure_banner_exists(banner_id).await?;
        }

        if changes.is_empty() {
            return Ok(meetup.into());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE meetups SET ");
        let mut separated = builder.separated(", ");
        if let Some(title) = changes.title {
            separated.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = changes.description {
            separated
                .push("description = ")
                .push_bind_unseparated(description);
        }
        if let Some(location) = changes.location {
            separated.push("location = ").push_bind_unseparated(location);
        }
        if let Some(date) = changes.date {
            separated.push("date = ").push_bind_unseparated(date);
        }
        match changes.banner_id {
            Some(Some(banner_id)) => {
                separated.push("banner_id = ").push_bind_unseparated(banner_id);
            }
            Some(None) => {
                separated.push("banner_id = NULL");
            }
            None => {}
        }
        separated.push("updated_at = ").push_bind_unseparated(now);

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" AND owner_id = ").push_bind(caller);
        builder.push(
            " RETURNING id, title, description, location, date, banner_id, owner_id, \
             created_at, updated_at",
        );

        let updated: Meetup = builder
            .build_query_as()
            .fetch_optional(&*self.db)
            .await?
            .ok_or(MeetupError::NotOwned {
                meetup: id,
                caller,
            })?;

        debug!(%id, "updated meetup");
        Ok(updated.into())
    }

    /// Delete one of the caller's upcoming meetups.
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> MeetupResult<()> {
        let meetup = self.fetch(id).await?.ok_or(MeetupError::NotFound(id))?;

        if meetup.owner_id != caller {
            return Err(MeetupError::Unauthorized {
                meetup: id,
                caller,
            });
        }
        if meetup.is_past() {
            return Err(MeetupError::PastMeetupDelete(id));
        }

        let result = sqlx::query("DELETE FROM meetups WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(caller)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(MeetupError::NotFound(id));
        }

        debug!(%id, "deleted meetup");
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> MeetupResult<Option<Meetup>> {
        let meetup = sqlx::query_as::<_, Meetup>(&format!(
            "SELECT {MEETUP_COLUMNS} FROM meetups m WHERE m.id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(meetup)
    }

    async fn fetch_with_banner(&self, id: Uuid) -> MeetupResult<Option<MeetupBannerRow>> {
        let row = sqlx::query_as::<_, MeetupBannerRow>(&format!(
            "SELECT {MEETUP_COLUMNS}, f.name AS file_name, f.path AS file_path
             FROM meetups m LEFT JOIN files f ON f.id = m.banner_id
             WHERE m.id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(row)
    }

    async fn ensure_user_exists(&self, id: Uuid) -> MeetupResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .map(|_| ())
            .ok_or(MeetupError::UnknownUser(id))
    }

    async fn ensure_banner_exists(&self, id: Uuid) -> MeetupResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1 FROM files WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .map(|_| ())
            .ok_or(MeetupError::BannerNotFound(id))
    }
}

/// Require a present, non-empty string.
fn required_text(value: Option<String>) -> MeetupResult<String> {
    match value {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(MeetupError::Validation),
    }
}

/// Reject a supplied but empty string; absent stays absent.
fn optional_text(value: Option<String>) -> MeetupResult<Option<String>> {
    value.map(|text| required_text(Some(text))).transpose()
}

fn validate_create(req: CreateMeetupRequest) -> MeetupResult<NewMeetup> {
    let date = req
        .date
        .as_deref()
        .and_then(parse_datetime)
        .ok_or(MeetupError::Validation)?;

    Ok(NewMeetup {
        title: required_text(req.title)?,
        description: required_text(req.description)?,
        location: required_text(req.location)?,
        date,
        banner_id: req.banner_id,
    })
}

fn validate_update(req: UpdateMeetupRequest) -> MeetupResult<MeetupChanges> {
    let date = req
        .date
        .map(|raw| parse_datetime(&raw).ok_or(MeetupError::Validation))
        .transpose()?;

    Ok(MeetupChanges {
        title: optional_text(req.title)?,
        description: optional_text(req.description)?,
        location: optional_text(req.location)?,
        date,
        banner_id: req.banner_id,
    })
}

/// Parse a meetup timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM[:SS[.f]]` read as UTC, or a
/// bare `YYYY-MM-DD` meaning midnight UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
}

/// Parse the `date` filter of a listing into a UTC calendar day.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

/// Half-open bounds `[start of day, start of next day)` covering `day`.
fn day_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = day
        .checked_add_days(Days::new(1))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Some((start, end))
}

/// Truncate `date` to its hour and refuse it when that hour starts before
/// `now`. A time later in the current hour is therefore refused too.
fn upcoming_hour(date: DateTime<Utc>, now: DateTime<Utc>) -> MeetupResult<DateTime<Utc>> {
    let date = start_of_hour(date);
    if date < now {
        debug!(%date, %now, "rejecting meetup in the past");
        return Err(MeetupError::PastDate);
    }
    Ok(date)
}

/// Truncate to the top of the hour.
pub fn start_of_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_minute(0)
        .and_then(|dt| dt.with_second(0))
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(dt)
}

/// Row offset of a 1-based page. Pages below 1 read as the first page.
fn page_offset(page: Option<u32>) -> i64 {
    let page = i64::from(page.unwrap_or(1).max(1));
    PAGE_SIZE * (page - 1)
}

/// Deserialize a field that distinguishes "absent" from "null".
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::fixtures, models::file::BannerRef};
    use chrono::{Duration, TimeZone};

    fn create_req(date: DateTime<Utc>) -> CreateMeetupRequest {
        CreateMeetupRequest {
            title: Some("Standup".into()),
            description: Some("d".into()),
            location: Some("Room A".into()),
            date: Some(date.to_rfc3339()),
            banner_id: None,
        }
    }

    async fn service() -> MeetupService {
        let pool = fixtures::memory_pool().await;
        MeetupService::new(Arc::new(pool), "http://files.test/files")
    }

    async fn count(service: &MeetupService) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM meetups")
            .fetch_one(&*service.db)
            .await
            .unwrap()
    }

    #[test]
    fn start_of_hour_drops_minutes_and_below() {
        let dt =
            Utc.with_ymd_and_hms(2030, 5, 1, 9, 41, 17).unwrap() + Duration::milliseconds(250);
        assert_eq!(
            start_of_hour(dt),
            Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn parse_datetime_accepts_common_shapes() {
        let expected = Utc.with_ymd_and_hms(2030, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(parse_datetime("2030-05-01T09:30:00Z"), Some(expected));
        assert_eq!(parse_datetime("2030-05-01T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_datetime("2030-05-01T09:30"), Some(expected));
        assert_eq!(
            parse_datetime("2030-05-01"),
            Some(Utc.with_ymd_and_hms(2030, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("next tuesday"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn page_offset_is_ten_per_page() {
        assert_eq!(page_offset(None), 0);
        assert_eq!(page_offset(Some(0)), 0);
        assert_eq!(page_offset(Some(1)), 0);
        assert_eq!(page_offset(Some(2)), 10);
        assert_eq!(page_offset(Some(5)), 40);
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let absent: UpdateMeetupRequest = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(absent.banner_id.is_none());

        let cleared: UpdateMeetupRequest = serde_json::from_str(r#"{"banner_id":null}"#).unwrap();
        assert_eq!(cleared.banner_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateMeetupRequest =
            serde_json::from_str(&format!(r#"{{"file_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.banner_id, Some(Some(id)));
    }

    #[tokio::test]
    async fn create_truncates_date_and_sets_owner() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let tomorrow_9 = (Utc::now() + Duration::days(1))
            .with_hour(9)
            .and_then(|d| d.with_minute(27))
            .unwrap();

        let created = service.create(owner, create_req(tomorrow_9)).await.unwrap();

        assert_eq!(created.meetup.owner_id, owner);
        assert_eq!(created.meetup.title, "Standup");
        assert_eq!(created.meetup.date, start_of_hour(tomorrow_9));
        assert_eq!(created.meetup.date.minute(), 0);
        assert!(!created.past);
        assert!(created.banner.is_none());
    }

    #[tokio::test]
    async fn create_embeds_banner() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let banner = fixtures::insert_file(&service.db, "banner.png", "abc123.png").await;

        let mut req = create_req(Utc::now() + Duration::days(2));
        req.banner_id = Some(banner);
        let created = service.create(owner, req).await.unwrap();

        let embedded = created.banner.expect("banner embedded");
        assert_eq!(embedded.id, banner);
        assert_eq!(embedded.path, "abc123.png");
        assert_eq!(embedded.url, "http://files.test/files/abc123.png");
    }

    #[tokio::test]
    async fn create_rejects_past_date_without_writing() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;

        let err = service
            .create(owner, create_req(Utc::now() - Duration::days(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, MeetupError::PastDate));
        assert_eq!(count(&service).await, 0);
    }

    #[test]
    fn upcoming_hour_refuses_an_hour_that_already_started() {
        let now = Utc.with_ymd_and_hms(2030, 5, 1, 10, 30, 0).unwrap();

        let later_this_hour = Utc.with_ymd_and_hms(2030, 5, 1, 10, 45, 0).unwrap();
        assert!(matches!(
            upcoming_hour(later_this_hour, now),
            Err(MeetupError::PastDate)
        ));

        let next_hour = Utc.with_ymd_and_hms(2030, 5, 1, 11, 5, 59).unwrap();
        assert_eq!(
            upcoming_hour(next_hour, now).unwrap(),
            Utc.with_ymd_and_hms(2030, 5, 1, 11, 0, 0).unwrap()
        );

        let on_the_hour = Utc.with_ymd_and_hms(2030, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(upcoming_hour(on_the_hour, on_the_hour).unwrap(), on_the_hour);
    }

    #[tokio::test]
    async fn create_rejects_missing_or_blank_fields() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let date = Utc::now() + Duration::days(1);

        let mut missing_title = create_req(date);
        missing_title.title = None;
        let mut empty_location = create_req(date);
        empty_location.location = Some(String::new());
        let mut bad_date = create_req(date);
        bad_date.date = Some("soon".into());
        let mut no_date = create_req(date);
        no_date.date = None;

        for req in [missing_title, empty_location, bad_date, no_date] {
            let err = service.create(owner, req).await.unwrap_err();
            assert!(matches!(err, MeetupError::Validation), "got {err:?}");
        }
        assert_eq!(count(&service).await, 0);
    }

    #[tokio::test]
    async fn create_accepts_whitespace_text() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let mut req = create_req(Utc::now() + Duration::days(1));
        req.description = Some("  ".into());

        let created = service.create(owner, req).await.unwrap();
        assert_eq!(created.meetup.description, "  ");
    }

    #[tokio::test]
    async fn create_rejects_unknown_banner_and_user() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let date = Utc::now() + Duration::days(1);

        let mut req = create_req(date);
        req.banner_id = Some(Uuid::new_v4());
        let err = service.create(owner, req).await.unwrap_err();
        assert!(matches!(err, MeetupError::BannerNotFound(_)));

        let err = service
            .create(Uuid::new_v4(), create_req(date))
            .await
            .unwrap_err();
        assert!(matches!(err, MeetupError::UnknownUser(_)));
        assert_eq!(count(&service).await, 0);
    }

    #[tokio::test]
    async fn list_paginates_by_ten() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let base = start_of_hour(Utc::now()) + Duration::days(1);
        let mut ids = Vec::new();
        for i in 0..25 {
            ids.push(fixtures::insert_meetup(&service.db, owner, base + Duration::hours(i)).await);
        }

        let first = service.list(None, None).await.unwrap();
        let second = service.list(None, Some(2)).await.unwrap();
        let third = service.list(None, Some(3)).await.unwrap();
        let fourth = service.list(None, Some(4)).await.unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert_eq!(third.len(), 5);
        assert!(fourth.is_empty());
        let second_ids: Vec<Uuid> = second.iter().map(|m| m.meetup.id).collect();
        assert_eq!(second_ids, &ids[10..20]);

        let owner_embed = first[0].owner.as_ref().expect("owner embedded");
        assert_eq!(owner_embed.id, owner);
        assert_eq!(owner_embed.email, "u@test");
    }

    #[tokio::test]
    async fn list_filters_by_calendar_day_inclusive() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let day = Utc.with_ymd_and_hms(2031, 3, 14, 0, 0, 0).unwrap();

        let at_midnight = fixtures::insert_meetup(&service.db, owner, day).await;
        let last_hour =
            fixtures::insert_meetup(&service.db, owner, day + Duration::hours(23)).await;
        fixtures::insert_meetup(&service.db, owner, day - Duration::hours(1)).await;
        fixtures::insert_meetup(&service.db, owner, day + Duration::days(1)).await;

        let found = service.list(Some("2031-03-14"), None).await.unwrap();
        let ids: Vec<Uuid> = found.iter().map(|m| m.meetup.id).collect();
        assert_eq!(ids, vec![at_midnight, last_hour]);

        let err = service.list(Some("14/03/2031"), None).await.unwrap_err();
        assert!(matches!(err, MeetupError::InvalidDate(_)));
    }

    #[tokio::test]
    async fn list_includes_past_meetups() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        fixtures::insert_meetup(&service.db, owner, Utc::now() - Duration::days(3)).await;

        let found = service.list(None, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].past);
    }

    #[tokio::test]
    async fn list_mine_only_returns_callers_meetups_in_date_order() {
        let service = service().await;
        let me = fixtures::insert_user(&service.db, "me@test").await;
        let other = fixtures::insert_user(&service.db, "other@test").await;
        let base = start_of_hour(Utc::now()) + Duration::days(1);

        let later = fixtures::insert_meetup(&service.db, me, base + Duration::days(2)).await;
        let sooner = fixtures::insert_meetup(&service.db, me, base).await;
        fixtures::insert_meetup(&service.db, other, base + Duration::hours(1)).await;

        let mine = service.list_mine(me, None).await.unwrap();
        let ids: Vec<Uuid> = mine.iter().map(|m| m.meetup.id).collect();
        assert_eq!(ids, vec![sooner, later]);
        assert!(service.list_mine(me, Some(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_mine_embeds_banner_reference() {
        let service = service().await;
        let me = fixtures::insert_user(&service.db, "me@test").await;
        let banner = fixtures::insert_file(&service.db, "cover.png", "covers/1.png").await;

        let mut with_banner = create_req(Utc::now() + Duration::days(1));
        with_banner.banner_id = Some(banner);
        service.create(me, with_banner).await.unwrap();
        service
            .create(me, create_req(Utc::now() + Duration::days(2)))
            .await
            .unwrap();

        let mine = service.list_mine(me, None).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(
            mine[0].banner,
            Some(BannerRef {
                id: banner,
                path: "covers/1.png".into(),
                url: "http://files.test/files/covers/1.png".into(),
            })
        );
        assert!(mine[1].banner.is_none());
    }

    #[tokio::test]
    async fn detail_projects_banner_as_img_meetup() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let banner = fixtures::insert_file(&service.db, "cover.jpg", "f00.jpg").await;
        let mut req = create_req(Utc::now() + Duration::days(1));
        req.banner_id = Some(banner);
        let created = service.create(owner, req).await.unwrap();

        let detail = service.detail(created.meetup.id).await.unwrap();
        assert_eq!(detail.id, created.meetup.id);
        assert_eq!(detail.banner_id, Some(banner));
        let img = detail.img_meetup.expect("banner metadata");
        assert_eq!(img.name, "cover.jpg");
        assert_eq!(img.url, "http://files.test/files/f00.jpg");

        let err = service.detail(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MeetupError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let created = service
            .create(owner, create_req(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        let next_week = Utc::now() + Duration::days(7);

        let updated = service
            .update(
                owner,
                created.meetup.id,
                UpdateMeetupRequest {
                    location: Some("Room B".into()),
                    date: Some(next_week.to_rfc3339()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Standup");
        assert_eq!(updated.location, "Room B");
        assert_eq!(updated.date, start_of_hour(next_week));

        let stored = service.fetch(created.meetup.id).await.unwrap().unwrap();
        assert_eq!(stored.owner_id, owner);
        assert_eq!(stored.location, "Room B");
    }

    #[tokio::test]
    async fn update_sets_and_clears_banner() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let banner = fixtures::insert_file(&service.db, "b.png", "b.png").await;
        let created = service
            .create(owner, create_req(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        let id = created.meetup.id;

        let set = UpdateMeetupRequest {
            banner_id: Some(Some(banner)),
            ..Default::default()
        };
        assert_eq!(
            service.update(owner, id, set).await.unwrap().banner_id,
            Some(banner)
        );

        let clear = UpdateMeetupRequest {
            banner_id: Some(None),
            ..Default::default()
        };
        assert_eq!(service.update(owner, id, clear).await.unwrap().banner_id, None);

        let missing = UpdateMeetupRequest {
            banner_id: Some(Some(Uuid::new_v4())),
            ..Default::default()
        };
        let err = service.update(owner, id, missing).await.unwrap_err();
        assert!(matches!(err, MeetupError::BannerNotFound(_)));
    }

    #[tokio::test]
    async fn update_by_non_owner_is_rejected_repeatedly() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "owner@test").await;
        let intruder = fixtures::insert_user(&service.db, "v@test").await;
        let created = service
            .create(owner, create_req(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        let original_date = created.meetup.date;

        for _ in 0..2 {
            let err = service
                .update(
                    intruder,
                    created.meetup.id,
                    UpdateMeetupRequest {
                        date: Some((Utc::now() + Duration::days(7)).to_rfc3339()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, MeetupError::NotOwned { .. }));
        }

        let stored = service.fetch(created.meetup.id).await.unwrap().unwrap();
        assert_eq!(stored.date, original_date);
    }

    #[tokio::test]
    async fn update_rejects_past_meetup_and_past_date() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "u@test").await;
        let past =
            fixtures::insert_meetup(&service.db, owner, Utc::now() - Duration::days(1)).await;

        let err = service
            .update(
                owner,
                past,
                UpdateMeetupRequest {
                    title: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MeetupError::PastMeetupEdit(_)));
        assert_ne!(service.fetch(past).await.unwrap().unwrap().title, "renamed");

        let upcoming = service
            .create(owner, create_req(Utc::now() + Duration::days(1)))
            .await
            .unwrap();
        let err = service
            .update(
                owner,
                upcoming.meetup.id,
                UpdateMeetupRequest {
                    date: Some((Utc::now() - Duration::days(2)).to_rfc3339()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MeetupError::PastDate));

        let err = service
            .update(
                owner,
                upcoming.meetup.id,
                UpdateMeetupRequest {
                    title: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MeetupError::Validation));
    }

    #[tokio::test]
    async fn delete_enforces_owner_and_past() {
        let service = service().await;
        let owner = fixtures::insert_user(&service.db, "owner@test").await;
        let intruder = fixtures::insert_user(&service.db, "v@test").await;
        let past =
            fixtures::insert_meetup(&service.db, owner, Utc::now() - Duration::hours(2)).await;
        let upcoming =
            fixtures::insert_meetup(&service.db, owner, Utc::now() + Duration::days(1)).await;

        for _ in 0..2 {
            let err = service.delete(intruder, upcoming).await.unwrap_err();
            assert!(matches!(err, MeetupError::Unauthorized { .. }));
            let err = service.delete(owner, past).await.unwrap_err();
            assert!(matches!(err, MeetupError::PastMeetupDelete(_)));
        }
        assert_eq!(count(&service).await, 2);

        service.delete(owner, upcoming).await.unwrap();
        assert!(service.fetch(upcoming).await.unwrap().is_none());

        let err = service.delete(owner, upcoming).await.unwrap_err();
        assert!(matches!(err, MeetupError::NotFound(_)));
    }
}
