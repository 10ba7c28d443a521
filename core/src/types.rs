//! Domain DTOs for the media-sharing API.
//!
//! # Design
//! These mirror the backend's JSON but are defined independently from the
//! mock-server crate; the integration tests catch schema drift. Response
//! types default optional fields so older or sparser backends still parse.

use serde::{Deserialize, Serialize};

/// A user as returned by `users/user` and embedded in the login response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Login body. Only lives for the duration of the login exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub full_name: Option<String>,
}

/// Partial user update. Only the fields present in the JSON are applied;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCreated {
    pub message: String,
    pub user_id: u64,
}

/// Bare `{"message": ...}` confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsernameAvailability {
    pub username: String,
    pub available: bool,
}

/// Lightweight entry from `media?start=&limit=`. Only the id is used; the
/// full record comes from the detail request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaListing {
    pub file_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w160: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w320: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w640: Option<String>,
}

/// Full media record from `media/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    pub file_id: u64,
    pub filename: String,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub user_id: u64,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub time_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Thumbnails>,
}

/// Tag association request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTag {
    pub file_id: u64,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagCreated {
    pub message: String,
    pub tag_id: u64,
}

/// A media record returned by `tags/{tag}`, carrying the matched tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaggedFile {
    #[serde(flatten)]
    pub media: MediaItem,
    pub tag: String,
}
