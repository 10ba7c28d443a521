//! Error types for the media-sharing API client.
//!
//! # Design
//! The backend reports failures as `{"message": ..., "error": ...}` bodies.
//! Every non-2xx response is normalized into `ApiError::Server` with a
//! single human-readable message built from that body, so views can show
//! it as-is. The remaining variants cover failures that never reached the
//! server or whose payload could not be read.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;

/// Errors returned by `MediaShareClient` parse methods and by `Api`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never produced a response (connection refused, DNS, ...).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// User-facing message. Never empty.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalize a non-2xx response.
    ///
    /// Prefers `"{message} : {error}"`, then `message`, then the status's
    /// reason phrase.
    pub(crate) fn from_response(response: &HttpResponse) -> Self {
        let status = response.status;
        let message = serde_json::from_str::<ErrorBody>(&response.body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status_text(status));
        ApiError::Server { status, message }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let message = self.message.filter(|m| !m.trim().is_empty());
        let error = self.error.and_then(|e| match e {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });
        match (message, error) {
            (Some(m), Some(e)) => Some(format!("{m} : {e}")),
            (Some(m), None) => Some(m),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }
}

fn status_text(status: u16) -> String {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
