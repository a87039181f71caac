//! The seam between the download worker and the network.

use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use reqwest::StatusCode;

use super::TransportError;

/// Streamed response body.
pub type BodyStream = BoxStream<'static, io::Result<Bytes>>;

/// Response to a GET: status plus a body that has not been read yet.
pub struct Payload {
    /// Response status code.
    pub status: StatusCode,
    /// Response body chunks.
    pub body: BodyStream,
}

impl Payload {
    /// Creates a payload from a body stream.
    #[must_use]
    pub fn new(status: StatusCode, body: BodyStream) -> Self {
        Self { status, body }
    }

    /// Creates a payload with a fully buffered body.
    #[must_use]
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::new(status, stream::once(async move { Ok(body) }).boxed())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Issues the GET request for one emote image.
///
/// [`HttpClient`](super::HttpClient) is the production implementation; the
/// engine only sees `dyn Transport`, so tests can observe or fault requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET to `url` and returns the status with an unread body.
    ///
    /// Non-success statuses are returned as a normal [`Payload`]; only
    /// connection-level failures are errors.
    async fn get(&self, url: &str) -> Result<Payload, TransportError>;
}
