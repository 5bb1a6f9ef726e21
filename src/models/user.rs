//! Represents the organizer that owns a meetup.
//!
//! User rows are written by the identity service; this crate only reads the
//! public columns it embeds in listings.

use serde::Serialize;
use uuid::Uuid;

/// Public subset of a user embedded in meetup listings.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Owner {
    /// Identifier forwarded by the auth gateway as the caller identity.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Contact address.
    pub email: String,
}
