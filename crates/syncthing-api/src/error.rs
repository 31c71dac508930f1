use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::transport::ResponseBody;

/// Top-level error type for the `syncthing-api` crate.
///
/// Splits failures the way the daemon does: the request never completed
/// (transport), the daemon answered with a status >= 300 (protocol), or the
/// answer could not be decoded. The event watcher reuses the same type for
/// poll failures so subscribers see exactly what a one-shot call would.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out on the client side.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS configuration error (bad CA file, client builder failure).
    #[error("TLS error: {0}")]
    Tls(String),

    /// The API key cannot be sent as an HTTP header value.
    #[error("Invalid API key header value")]
    InvalidApiKey,

    // ── Protocol ────────────────────────────────────────────────────
    /// The daemon answered with a status code outside `[0, 300)`.
    ///
    /// Carries the full response envelope so callers can tell a 400-class
    /// validation message from a 500-class server fault.
    #[error("Syncthing API error (HTTP {status}): {}", body.preview())]
    Api {
        status: StatusCode,
        headers: HeaderMap,
        body: ResponseBody,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON (de)serialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Event watcher ───────────────────────────────────────────────
    /// The background poll task panicked or was aborted.
    #[error("Event watcher task failed: {0}")]
    WatchTask(String),
}

impl Error {
    /// HTTP status of a protocol failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns `true` for 400-class protocol failures.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    /// Returns `true` for 500-class protocol failures.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Returns `true` if the daemon rejected the API key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        ) || matches!(self, Self::InvalidApiKey)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// The daemon's error message for a protocol failure.
    ///
    /// Syncthing answers validation failures with a plain-text body; some
    /// endpoints wrap it in `{"error": "..."}`.
    pub fn message(&self) -> Option<String> {
        let Self::Api { body, .. } = self else {
            return None;
        };
        match body {
            ResponseBody::Json(value) => Some(
                value
                    .get("error")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| value.to_string(), str::to_owned),
            ),
            ResponseBody::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn api_error(status: u16, body: ResponseBody) -> Error {
        Error::Api {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body,
        }
    }

    #[test]
    fn classifies_status_families() {
        let bad = api_error(400, ResponseBody::Text("invalid folder".into()));
        assert!(bad.is_client_error());
        assert!(!bad.is_server_error());
        assert!(!bad.is_transient());

        let broken = api_error(500, ResponseBody::Text(String::new()));
        assert!(broken.is_server_error());
        assert!(broken.is_transient());

        assert!(api_error(403, ResponseBody::Text("CSRF Error".into())).is_unauthorized());
    }

    #[test]
    fn message_prefers_error_field() {
        let err = api_error(500, ResponseBody::Json(json!({ "error": "database locked" })));
        assert_eq!(err.message().as_deref(), Some("database locked"));

        let err = api_error(400, ResponseBody::Text("  no such device\n".into()));
        assert_eq!(err.message().as_deref(), Some("no such device"));

        let err = api_error(404, ResponseBody::Text(String::new()));
        assert!(err.message().is_none());
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = api_error(500, ResponseBody::Text("boom".into()));
        let text = err.to_string();
        assert!(text.contains("500"), "{text}");
        assert!(text.contains("boom"), "{text}");
    }
}
