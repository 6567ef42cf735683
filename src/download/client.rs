//! HTTP client wrapper for the book host.
//!
//! This module provides the [`HttpClient`] struct which carries the
//! browser-like default headers, resolves endpoint URLs against the configured
//! base URL, and attaches the explicit [`Session`] to every request.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderName, HeaderValue, REFERER,
    UPGRADE_INSECURE_REQUESTS,
};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use crate::session::Session;
use crate::user_agent::{BROWSER_ACCEPT_LANGUAGE, BROWSER_USER_AGENT};

/// HTTP client for the book host.
///
/// Created once per run and reused for every document, taking advantage of
/// connection pooling. Session state is never stored in the client; it is
/// passed into each call instead.
///
/// # Example
///
/// ```no_run
/// use pagegrab_core::download::HttpClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new("https://books.google.se")?;
/// let landing = client.endpoint("/books", &[("id", "abc123")])?;
/// assert!(landing.as_str().contains("id=abc123"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Creates a client for `base_url` with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] for an unparseable base URL and
    /// [`DownloadError::Client`] when the underlying client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, DownloadError> {
        Self::with_timeouts(base_url, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::new`].
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        base_url: &str,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, DownloadError> {
        let base_url =
            Url::parse(base_url).map_err(|_| DownloadError::invalid_url(base_url.to_string()))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers())
            .build()
            .map_err(DownloadError::client)?;
        Ok(Self { client, base_url })
    }

    /// Returns the base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an absolute endpoint URL with the given query pairs appended in order.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`] when `path` cannot be joined onto the base URL.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, DownloadError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| DownloadError::invalid_url(format!("{}{path}", self.base_url)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Issues a GET and returns the response whatever its status.
    ///
    /// When a session is given its cookies and referer are attached.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Timeout`] or [`DownloadError::Network`] on transport failure.
    #[instrument(level = "debug", skip(self, session))]
    pub async fn get(
        &self,
        url: &str,
        session: Option<&Session>,
    ) -> Result<reqwest::Response, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(session) = session {
            if !session.cookie_header().is_empty() {
                request = request.header(COOKIE, session.cookie_header());
            }
            request = request.header(REFERER, session.referer());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;
        debug!(status = response.status().as_u16(), "response received");
        Ok(response)
    }

    /// Issues a GET and returns the body text of a successful response.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::HttpStatus`] for non-2xx responses, plus the
    /// transport errors of [`HttpClient::get`].
    pub async fn get_text(
        &self,
        url: &str,
        session: Option<&Session>,
    ) -> Result<String, DownloadError> {
        let response = self.get(url, session).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| DownloadError::network(url, e))
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers
}

/// Streams a response body to `file_path`, returning bytes written.
///
/// A partially written file is removed when streaming fails.
pub(crate) async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let file = File::create(file_path)
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    let result = write_body(file, response, url, file_path).await;
    if result.is_err() {
        debug!(path = %file_path.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(file_path).await;
    }
    result
}

async fn write_body(
    file: File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
