//! Error types for the download module.
//!
//! Every variant is a per-task failure: it is recorded on the task's outcome
//! and counted, and the run moves on to the next task.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::media::InlineDecodeError;

/// Errors that can occur while transferring a single reference.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server stopped sending headers or body data for longer than the stall timeout.
    #[error("transfer stalled for {}s downloading {url}", .idle.as_secs())]
    Stalled {
        /// The URL that stalled.
        url: String,
        /// Idle period that elapsed.
        idle: Duration,
    },

    /// Response status outside 200-299.
    #[error("server responded with status code {status} for {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error (create directory, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An inline payload could not be decoded.
    #[error("failed to decode inline data: {source}")]
    InlineDecode {
        /// The decode failure.
        #[from]
        source: InlineDecodeError,
    },

    /// The reference carries no target (neither URL nor inline payload).
    #[error("reference has no downloadable target: {reference}")]
    NoTarget {
        /// Shortened reference text.
        reference: String,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a stall error.
    pub fn stalled(url: impl Into<String>, idle: Duration) -> Self {
        Self::Stalled {
            url: url.into(),
            idle,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a missing-target error.
    pub fn no_target(reference: impl Into<String>) -> Self {
        Self::NoTarget {
            reference: reference.into(),
        }
    }
}
