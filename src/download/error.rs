//! Error types for page fetches and document downloads.
//!
//! Every variant carries the context (URL or path) needed to report the
//! failure without re-deriving it at the call site.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching pages or downloading documents.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("transport error fetching {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    ServerStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// The Retry-After header value, if present (for 429 responses).
        retry_after: Option<String>,
    },

    /// File system error while writing the document.
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

    /// The server returned a success status but a zero-length body.
    ///
    /// The catalog serves empty files for some withdrawn documents;
    /// these are never worth keeping.
    #[error("empty document body from {url}")]
    EmptyDocument {
        /// The URL that served an empty body.
        url: String,
    },
}

impl DownloadError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a server status error without a Retry-After value.
    pub fn server_status(url: impl Into<String>, status: u16) -> Self {
        Self::ServerStatus {
            url: url.into(),
            status,
            retry_after: None,
        }
    }

    /// Creates a server status error carrying a Retry-After header value.
    pub fn server_status_with_retry_after(
        url: impl Into<String>,
        status: u16,
        retry_after: Option<String>,
    ) -> Self {
        Self::ServerStatus {
            url: url.into(),
            status,
            retry_after,
        }
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

    /// Creates an empty document error.
    pub fn empty_document(url: impl Into<String>) -> Self {
        Self::EmptyDocument { url: url.into() }
    }
}

// From<reqwest::Error> and From<std::io::Error> are intentionally not
// implemented: every variant needs the URL or path context the source
// errors lack, so the helper constructors are the only entry points.
