//! Error types for catalog retrieval and selection.

use thiserror::Error;

/// Errors raised while building or querying the emote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level failure reaching the catalog API.
    #[error("error connecting to api at {url}: {source}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The user lookup returned a non-success status.
    #[error("user {user_id} not found. Error Code: {status}")]
    UserNotFound {
        /// The requested user id.
        user_id: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Any other catalog request returned a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("can't decode response body from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured API base URL is not a usable URL.
    #[error("invalid catalog API URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// A requested set name is not part of the catalog.
    #[error("emote set '{name}' not found")]
    UnknownSet {
        /// The requested set name.
        name: String,
    },

    /// A format tag outside the supported vocabulary.
    #[error("unknown image format '{tag}' (expected one of: webp, avif, png, gif)")]
    UnknownFormat {
        /// The rejected tag.
        tag: String,
    },

    /// A size tag that cannot be used as a path component.
    #[error("invalid image size '{tag}'")]
    InvalidSize {
        /// The rejected tag.
        tag: String,
    },
}

impl CatalogError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a user-not-found error.
    pub fn user_not_found(user_id: impl Into<String>, status: u16) -> Self {
        Self::UserNotFound {
            user_id: user_id.into(),
            status,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an unknown set error.
    pub fn unknown_set(name: impl Into<String>) -> Self {
        Self::UnknownSet { name: name.into() }
    }

    /// Creates an unknown format error.
    pub fn unknown_format(tag: impl Into<String>) -> Self {
        Self::UnknownFormat { tag: tag.into() }
    }

    /// Creates an invalid size error.
    pub fn invalid_size(tag: impl Into<String>) -> Self {
        Self::InvalidSize { tag: tag.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_not_found_display() {
        let msg = CatalogError::user_not_found("abc123", 404).to_string();
        assert!(msg.contains("abc123"), "Expected user id in: {msg}");
        assert!(msg.contains("404"), "Expected status in: {msg}");
    }

    #[test]
    fn test_unknown_set_display() {
        let msg = CatalogError::unknown_set("Global").to_string();
        assert_eq!(msg, "emote set 'Global' not found");
    }

    #[test]
    fn test_unknown_format_lists_choices() {
        let msg = CatalogError::unknown_format("jpeg").to_string();
        assert!(msg.contains("jpeg"));
        assert!(msg.contains("webp, avif, png, gif"));
    }
}
