//! Represents stored banner images.
//!
//! Files are uploaded and served by a separate storage service; this crate
//! only reads their metadata and derives the public URL.

use serde::Serialize;
use uuid::Uuid;

/// Build the public URL of a stored file.
pub fn public_url(files_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        files_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Banner reference embedded in create and "my meetups" responses.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BannerRef {
    pub id: Uuid,
    pub path: String,
    pub url: String,
}

/// Banner metadata embedded in the detail response.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BannerDetail {
    pub path: String,
    pub id: Uuid,
    pub name: String,
    pub url: String,
}
