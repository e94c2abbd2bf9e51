//! Centralized error types for dormmail.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Why the dorm mail page could not be retrieved.
///
/// Every variant means "no data available", which callers must keep
/// apart from an `Ok` empty list ("no packages posted right now").
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request to '{url}' timed out")]
    Timeout { url: String },

    /// The host could not be reached.
    #[error("could not connect to '{url}': {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("'{url}' answered with status {status}")]
    Status { url: String, status: StatusCode },

    /// Any other transport failure, including reading the body.
    #[error("transport error for '{url}': {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered 2xx but sent no bytes.
    #[error("'{url}' returned an empty body")]
    EmptyBody { url: String },
}

impl FetchError {
    /// Classify a reqwest error raised while talking to `url`.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_connect() {
            Self::Connect { url, source }
        } else if let Some(status) = source.status() {
            Self::Status { url, status }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Whether the board itself could not be reached or served nothing.
    ///
    /// `false` only for `Client`, which is a local misconfiguration
    /// (for example a malformed `proxy_url`) rather than an upstream outage.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, Self::Client(_))
    }
}

/// All errors produced by the dormmail library.
#[derive(Error, Debug)]
pub enum DormMailError {
    /// Fetching the upstream page failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// An export operation failed.
    #[error("export error: {0}")]
    ExportError(String),
}

/// Convenience alias for `Result<T, DormMailError>`.
pub type Result<T> = std::result::Result<T, DormMailError>;

impl DormMailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let err = DormMailError::io(
            "/nope/page.html",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(matches!(err, DormMailError::FileNotFound(_)));
    }

    #[test]
    fn test_status_message_mentions_url() {
        let err = FetchError::Status {
            url: "http://example.test/".into(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        let msg = err.to_string();
        assert!(msg.contains("example.test"));
        assert!(msg.contains("503"));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_timeout_and_empty_body_are_unavailable() {
        let url = "http://example.test/".to_string();
        assert!(FetchError::Timeout { url: url.clone() }.is_unavailable());
        assert!(FetchError::EmptyBody { url }.is_unavailable());
    }
}
