//! Stateless HTTP request builder and response parser for the media API.
//!
//! # Design
//! `MediaShareClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the HTTP round-trip, keeping this
//! module deterministic and free of I/O.
//!
//! Any 2xx status is accepted as success; everything else goes through
//! `ApiError::from_response`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::media::MediaPage;
use crate::types::{
    Credentials, LoginResponse, MediaItem, MediaListing, MessageResponse, NewTag, NewUser,
    TagCreated, TaggedFile, User, UserCreated, UserUpdate, UsernameAvailability,
};

/// Header carrying the session token on authenticated requests.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Synchronous, stateless client for the media-sharing API.
#[derive(Debug, Clone)]
pub struct MediaShareClient {
    base_url: String,
}

impl MediaShareClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- media ---

    pub fn build_list_media(&self, page: MediaPage) -> HttpRequest {
        self.get(format!(
            "{}/media?start={}&limit={}",
            self.base_url, page.start, page.limit
        ))
    }

    pub fn build_get_media(&self, file_id: u64) -> HttpRequest {
        self.get(format!("{}/media/{file_id}", self.base_url))
    }

    pub fn parse_list_media(&self, response: HttpResponse) -> Result<Vec<MediaListing>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_media(&self, response: HttpResponse) -> Result<MediaItem, ApiError> {
        parse_json(response)
    }

    // --- login ---

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}/login", self.base_url), credentials, None)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    // --- users ---

    pub fn build_get_user_by_token(&self, token: &str) -> HttpRequest {
        let mut req = self.get(format!("{}/users/user", self.base_url));
        req.headers.push((TOKEN_HEADER.to_string(), token.to_string()));
        req
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn build_create_user(&self, input: &NewUser) -> Result<HttpRequest, ApiError> {
        self.with_json(HttpMethod::Post, format!("{}/users", self.base_url), input, None)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<UserCreated, ApiError> {
        parse_json(response)
    }

    pub fn build_update_user(&self, input: &UserUpdate, token: &str) -> Result<HttpRequest, ApiError> {
        self.with_json(
            HttpMethod::Put,
            format!("{}/users", self.base_url),
            input,
            Some(token),
        )
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<MessageResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_check_username(&self, username: &str) -> HttpRequest {
        self.get(format!(
            "{}/users/username/{}",
            self.base_url,
            urlencoding::encode(username)
        ))
    }

    /// Extracts the `available` flag.
    pub fn parse_check_username(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_json::<UsernameAvailability>(response).map(|a| a.available)
    }

    // --- tags ---

    pub fn build_create_tag(&self, input: &NewTag, token: &str) -> Result<HttpRequest, ApiError> {
        self.with_json(
            HttpMethod::Post,
            format!("{}/tags/", self.base_url),
            input,
            Some(token),
        )
    }

    pub fn parse_create_tag(&self, response: HttpResponse) -> Result<TagCreated, ApiError> {
        parse_json(response)
    }

    pub fn build_files_by_tag(&self, tag: &str) -> HttpRequest {
        self.get(format!("{}/tags/{}", self.base_url, urlencoding::encode(tag)))
    }

    pub fn parse_files_by_tag(&self, response: HttpResponse) -> Result<Vec<TaggedFile>, ApiError> {
        parse_json(response)
    }

    fn get(&self, path: String) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_json<B: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        input: &B,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push((TOKEN_HEADER.to_string(), token.to_string()));
        }
        Ok(HttpRequest {
            method,
            path,
            headers,
            body: Some(body),
        })
    }
}

/// Map non-success statuses to `ApiError`, otherwise decode the body.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(&response));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
