//! Error types for the download module.
//!
//! [`FetchError`] is the per-target failure recorded in the run's error log;
//! its `Display` text is what users read there. [`TransportError`] is the
//! connection-level failure underneath it.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Boxed error source carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Connection-level failure while requesting a URL.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The URL is malformed or uses an unsupported scheme.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The request timed out before a response arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// DNS, connect, TLS or protocol failure.
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying error.
        #[source]
        source: BoxError,
    },
}

impl TransportError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a network error from any error source.
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Why a single target could not be materialized on disk.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("failed to get emote {name}")]
    Network {
        /// Emote display name.
        name: String,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// The server answered with a non-success status.
    #[error("failed to get emote {name}. Status Code: {status}")]
    HttpStatus {
        /// Emote display name.
        name: String,
        /// The response status.
        status: StatusCode,
    },

    /// The destination directory could not be created.
    #[error("failed to create directory {} for emote: {name}", dir.display())]
    CreateDir {
        /// The directory that could not be created.
        dir: PathBuf,
        /// Emote display name.
        name: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The destination file could not be created.
    #[error("failed to create file for {filename}")]
    CreateFile {
        /// Destination file name.
        filename: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the body or writing it to disk failed part-way.
    #[error("failed to write emote to file {filename}")]
    WriteFile {
        /// Destination file name.
        filename: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The task driving this target panicked.
    #[error("download task for emote {name} panicked")]
    TaskPanicked {
        /// Emote display name.
        name: String,
    },
}

impl FetchError {
    /// Creates a network failure.
    pub fn network(name: impl Into<String>, source: TransportError) -> Self {
        Self::Network {
            name: name.into(),
            source,
        }
    }

    /// Creates a non-success status failure.
    pub fn http_status(name: impl Into<String>, status: StatusCode) -> Self {
        Self::HttpStatus {
            name: name.into(),
            status,
        }
    }

    /// Creates a directory creation failure.
    pub fn create_dir(dir: impl Into<PathBuf>, name: impl Into<String>, source: std::io::Error) -> Self {
        Self::CreateDir {
            dir: dir.into(),
            name: name.into(),
            source,
        }
    }

    /// Creates a file creation failure.
    pub fn create_file(filename: impl Into<String>, source: std::io::Error) -> Self {
        Self::CreateFile {
            filename: filename.into(),
            source,
        }
    }

    /// Creates a write failure.
    pub fn write_file(filename: impl Into<String>, source: std::io::Error) -> Self {
        Self::WriteFile {
            filename: filename.into(),
            source,
        }
    }

    /// Creates a task panic failure.
    pub fn task_panicked(name: impl Into<String>) -> Self {
        Self::TaskPanicked { name: name.into() }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// emote name or path, which the source errors don't carry.

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_fetch_error_network_display() {
        let error = FetchError::network(
            "Pog",
            TransportError::network("https://cdn/pog.gif", "connection refused"),
        );
        assert_eq!(error.to_string(), "failed to get emote Pog");
        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("network error requesting https://cdn/pog.gif: connection refused")
        );
    }

    #[test]
    fn test_fetch_error_http_status_display() {
        let error = FetchError::http_status("Pog", StatusCode::NOT_FOUND);
        assert_eq!(
            error.to_string(),
            "failed to get emote Pog. Status Code: 404 Not Found"
        );
    }

    #[test]
    fn test_fetch_error_create_dir_display() {
        let error = FetchError::create_dir(
            "emotes/alice/Global/GIF2x",
            "Pog",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(
            error.to_string(),
            "failed to create directory emotes/alice/Global/GIF2x for emote: Pog"
        );
    }

    #[test]
    fn test_fetch_error_file_displays() {
        let create = FetchError::create_file("Pog.gif", io::Error::other("boom"));
        assert_eq!(create.to_string(), "failed to create file for Pog.gif");

        let write = FetchError::write_file("Pog.gif", io::Error::other("boom"));
        assert_eq!(write.to_string(), "failed to write emote to file Pog.gif");
    }

    #[test]
    fn test_fetch_error_task_panicked_display() {
        let error = FetchError::task_panicked("Pog");
        assert_eq!(error.to_string(), "download task for emote Pog panicked");
    }

    #[test]
    fn test_transport_error_displays() {
        assert_eq!(
            TransportError::invalid_url("nope").to_string(),
            "invalid URL: nope"
        );
        assert_eq!(
            TransportError::timeout("https://cdn/x").to_string(),
            "timeout requesting https://cdn/x"
        );
    }
}
