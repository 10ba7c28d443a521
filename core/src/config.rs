//! Client configuration read from the environment.

use std::env;
use std::path::PathBuf;

use crate::media::MediaPage;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TOKEN_PATH: &str = "mediashare-storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base address; request paths are appended to it.
    pub base_url: String,
    /// Page used by the initial media load.
    pub media_page: MediaPage,
    /// File backing the `FileStore` holding the session token.
    pub token_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            media_page: MediaPage::default(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIASHARE_BASE_URL` (default: `http://localhost:3000`)
    /// - `MEDIASHARE_MEDIA_START` (default: 10)
    /// - `MEDIASHARE_MEDIA_LIMIT` (default: 20)
    /// - `MEDIASHARE_TOKEN_PATH` (default: `mediashare-storage.json`)
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("MEDIASHARE_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let start = lookup("MEDIASHARE_MEDIA_START")
            .and_then(|s| s.parse().ok())
            .unwrap_or(MediaPage::DEFAULT_START);
        let limit = lookup("MEDIASHARE_MEDIA_LIMIT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(MediaPage::DEFAULT_LIMIT);
        let token_path = lookup("MEDIASHARE_TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH));

        Self {
            base_url,
            media_page: MediaPage::new(start, limit),
            token_path,
        }
    }
}
