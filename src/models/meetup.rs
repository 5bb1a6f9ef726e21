//! Represents a scheduled meetup and the JSON views built from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    file::{BannerDetail, BannerRef},
    user::Owner,
};

/// A meetup row.
///
/// Owner and banner are plain ids; the listing views resolve them through
/// explicit joins rather than embedding the referenced records here.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Meetup {
    /// Generated at creation, never changes.
    pub id: Uuid,

    /// Short headline.
    pub title: String,

    /// Free-form description.
    pub description: String,

    /// Where the meetup happens.
    pub location: String,

    /// Start time, always truncated to the top of the hour (UTC).
    pub date: DateTime<Utc>,

    /// Optional banner image stored by the file service.
    pub banner_id: Option<Uuid>,

    /// User that created the meetup. Set once at creation.
    pub owner_id: Uuid,

    /// When the row was inserted.
    pub created_at: DateTime<Utc>,

    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

impl Meetup {
    /// Whether the meetup already started relative to `now`.
    pub fn is_past_at(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }

    /// Whether the meetup already started.
    pub fn is_past(&self) -> bool {
        self.is_past_at(Utc::now())
    }
}

/// Meetup row joined with its owner's public columns.
#[derive(FromRow, Debug)]
pub struct MeetupOwnerRow {
    #[sqlx(flatten)]
    pub meetup: Meetup,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

/// Meetup row joined with its banner file columns.
#[derive(FromRow, Debug)]
pub struct MeetupBannerRow {
    #[sqlx(flatten)]
    pub meetup: Meetup,
    pub file_name: Option<String>,
    pub file_path: Option<String>,
}

/// `GET /meetups` item: the meetup plus its owner.
#[derive(Serialize, Debug)]
pub struct MeetupWithOwner {
    #[serde(flatten)]
    pub meetup: Meetup,
    pub past: bool,
    pub owner: Option<Owner>,
}

impl From<MeetupOwnerRow> for MeetupWithOwner {
    fn from(row: MeetupOwnerRow) -> Self {
        let owner = match (row.owner_name, row.owner_email) {
            (Some(name), Some(email)) => Some(Owner {
                id: row.meetup.owner_id,
                name,
                email,
            }),
            _ => None,
        };

        Self {
            past: row.meetup.is_past(),
            meetup: row.meetup,
            owner,
        }
    }
}

/// Created meetup and `GET /meetups/mine` item: the meetup plus its banner.
#[derive(Serialize, Debug)]
pub struct MeetupWithBanner {
    #[serde(flatten)]
    pub meetup: Meetup,
    pub past: bool,
    pub banner: Option<BannerRef>,
}

impl MeetupWithBanner {
    pub fn from_row(row: MeetupBannerRow, files_url: &str) -> Self {
        let banner = match (row.meetup.banner_id, row.file_path) {
            (Some(id), Some(path)) => Some(BannerRef {
                id,
                url: super::file::public_url(files_url, &path),
                path,
            }),
            _ => None,
        };

        Self {
            past: row.meetup.is_past(),
            meetup: row.meetup,
            banner,
        }
    }
}

/// `GET /meetups/{id}` body.
#[derive(Serialize, Debug)]
pub struct MeetupDetail {
    pub id: Uuid,
    pub banner_id: Option<Uuid>,
    pub description: String,
    pub title: String,
    pub location: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "imgMeetup")]
    pub img_meetup: Option<BannerDetail>,
}

impl MeetupDetail {
    pub fn from_row(row: MeetupBannerRow, files_url: &str) -> Self {
        let img_meetup = match (row.meetup.banner_id, row.file_name, row.file_path) {
            (Some(id), Some(name), Some(path)) => Some(BannerDetail {
                url: super::file::public_url(files_url, &path),
                path,
                id,
                name,
            }),
            _ => None,
        };

        let meetup = row.meetup;
        Self {
            id: meetup.id,
            banner_id: meetup.banner_id,
            description: meetup.description,
            title: meetup.title,
            location: meetup.location,
            date: meetup.date,
            img_meetup,
        }
    }
}

/// `PUT /meetups/{id}` body: the mutable fields after the write.
#[derive(Serialize, Debug, PartialEq)]
pub struct MeetupUpdated {
    pub title: String,
    pub description: String,
    pub location: String,
    pub banner_id: Option<Uuid>,
    pub date: DateTime<Utc>,
}

impl From<Meetup> for MeetupUpdated {
    fn from(meetup: Meetup) -> Self {
        Self {
            title: meetup.title,
            description: meetup.description,
            location: meetup.location,
            banner_id: meetup.banner_id,
            date: meetup.date,
        }
    }
}
