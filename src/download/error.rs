//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so callers can log a
//! useful warning without extra bookkeeping.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to the book host or writing responses to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response carried a content type the caller does not accept.
    #[error("unexpected content type '{content_type}' from {url}")]
    UnsupportedContentType {
        /// The URL that was requested.
        url: String,
        /// The media type the server declared (empty when absent).
        content_type: String,
    },

    /// File system error while writing a response body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl DownloadError {
    /// Creates a client construction error.
    pub fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an unsupported content type error.
    pub fn unsupported_content_type(
        url: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self::UnsupportedContentType {
            url: url.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://books.example/page");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://books.example/page"));
    }

    #[test]
    fn test_download_error_http_status_display() {
        let error = DownloadError::http_status("https://books.example/page", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://books.example/page"),
            "Expected URL in: {msg}"
        );
        assert!(matches!(error, DownloadError::HttpStatus { status: 404, .. }));
    }

    #[test]
    fn test_download_error_content_type_display() {
        let error = DownloadError::unsupported_content_type("https://books.example/p", "text/html");
        let msg = error.to_string();
        assert!(msg.contains("text/html"), "Expected media type in: {msg}");
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/page0.png"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/page0.png"), "Expected path in: {msg}");
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(
            msg.contains("invalid URL"),
            "Expected 'invalid URL' in: {msg}"
        );
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
    }
}
