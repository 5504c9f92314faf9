// ── Core error types ──
//
// Deploy-level errors from balloon-core. The `From<balloon_api::Error>`
// impl translates transport-layer errors into these variants; timeout and
// cancellation of the readiness wait are their own values and are never
// produced by a server response.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local errors ─────────────────────────────────────────────────
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not valid UTF-8: {}", path.display())]
    InvalidPath { path: PathBuf },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    RequestTimeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Readiness wait ───────────────────────────────────────────────
    #[error("Timed out after {timeout_secs}s waiting for the site to become ready")]
    Timeout { timeout_secs: u64 },

    #[error("Wait for readiness was cancelled")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Cannot fetch or update a site without an ID")]
    MissingSiteId,

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<balloon_api::Error> for CoreError {
    fn from(err: balloon_api::Error) -> Self {
        match err {
            balloon_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "access token rejected".into(),
            },
            balloon_api::Error::InvalidToken { message } => {
                CoreError::AuthenticationFailed { message }
            }
            balloon_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::RequestTimeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            balloon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            balloon_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            balloon_api::Error::Api { status: 404, message } => {
                CoreError::NotFound { resource: message }
            }
            balloon_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            balloon_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("malformed response: {message}"),
                status: None,
            },
            balloon_api::Error::Io { path, source } => CoreError::Io { path, source },
            balloon_api::Error::MissingSiteId => CoreError::MissingSiteId,
        }
    }
}
