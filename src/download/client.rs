//! HTTP client wrapper used for emote downloads.
//!
//! This module provides the `HttpClient` struct which owns a pooled reqwest
//! client with timeout configuration and implements [`Transport`].

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::transport::{Payload, Transport};
use super::TransportError;

/// User-Agent sent with every request.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("emote-downloader/{version}")
}

/// HTTP client for downloading emote images with streaming support.
///
/// Create it once and clone it freely; clones share the connection pool.
///
/// # Example
///
/// ```no_run
/// use emote_downloader::download::{HttpClient, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let payload = client.get("https://cdn.7tv.app/emote/60ae958e229664e8667aea38/4x.gif").await?;
/// println!("status: {}", payload.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error if the TLS backend cannot be initialized.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(default_user_agent())
            .build()?;
        Ok(Self { client })
    }

    /// Returns a reference to the underlying reqwest client.
    ///
    /// The catalog client reuses it so API and CDN traffic share one pool.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &str) -> Result<Payload, TransportError> {
        let parsed = Url::parse(url).map_err(|_| TransportError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::invalid_url(url));
        }

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::timeout(url)
            } else {
                TransportError::network(url, e)
            }
        })?;

        let status = response.status();
        debug!(%status, "response received");

        let body = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        Ok(Payload::new(status, body.boxed()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent_contains_version() {
        let ua = default_user_agent();
        assert_eq!(
            ua.strip_prefix("emote-downloader/"),
            Some(env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn test_http_client_builds_with_custom_timeouts() {
        assert!(HttpClient::with_timeouts(5, 10).is_ok());
    }

    #[tokio::test]
    async fn test_get_rejects_invalid_url() {
        let client = HttpClient::new().unwrap();
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_get_rejects_non_http_scheme() {
        let client = HttpClient::new().unwrap();
        let err = client.get("file:///etc/passwd").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }
}
