//! HTTP client wrapper for media transfers.
//!
//! One [`HttpClient`] is built per run and reused for every network task so
//! connections to the same host are pooled.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, redirect};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, MEDIA_ACCEPT, STALL_TIMEOUT};
use super::error::DownloadError;
use crate::renderer::SPOOFED_USER_AGENT;

/// HTTP client sending the fixed browser-like header set.
///
/// # Example
///
/// ```no_run
/// use media_harvester::download::HttpClient;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let url = url::Url::parse("https://example.com/photo.jpg")?;
/// let response = client.fetch(&url, "https://example.com/").await?;
/// let bytes = client
///     .write_body(response, url.as_str(), Path::new("photo.jpg"), |_| {})
///     .await?;
/// println!("wrote {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    stall_timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the default stall timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_stall_timeout(STALL_TIMEOUT)
    }

    /// Creates a client that gives up on a transfer idle for `stall_timeout`.
    ///
    /// Redirects are not followed; a 3xx answer is a failed transfer.
    ///
    /// # Errors
    ///
    /// Returns the builder error when the TLS backend cannot be initialised.
    pub fn with_stall_timeout(stall_timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(SPOOFED_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_ACCEPT));

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            stall_timeout,
        })
    }

    /// Idle bound applied to response headers and to each body chunk.
    #[must_use]
    pub fn stall_timeout(&self) -> Duration {
        self.stall_timeout
    }

    /// Issues the GET and checks the status; no file is touched here.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Network`] when the request cannot be sent
    /// - [`DownloadError::Stalled`] when headers do not arrive in time
    /// - [`DownloadError::HttpStatus`] for any status outside 200-299
    #[instrument(skip(self, referer), fields(url = %url))]
    pub async fn fetch(&self, url: &Url, referer: &str) -> Result<reqwest::Response, DownloadError> {
        let mut request = self.client.get(url.clone());
        if !referer.is_empty()
            && let Ok(value) = HeaderValue::from_str(referer)
        {
            request = request.header(REFERER, value);
        }

        let response = tokio::time::timeout(self.stall_timeout, request.send())
            .await
            .map_err(|_| DownloadError::stalled(url.as_str(), self.stall_timeout))?
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }
        debug!(status = status.as_u16(), content_length = ?response.content_length(), "response headers received");
        Ok(response)
    }

    /// Streams the response body into a new file at `path`.
    ///
    /// `on_chunk` receives the running byte total after every chunk. The file
    /// is removed when anything fails after it was created.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Io`] when the file cannot be created or written
    /// - [`DownloadError::Network`] when the body stream fails
    /// - [`DownloadError::Stalled`] when no chunk arrives in time
    pub async fn write_body<F>(
        &self,
        response: reqwest::Response,
        url: &str,
        path: &Path,
        on_chunk: F,
    ) -> Result<u64, DownloadError>
    where
        F: FnMut(u64),
    {
        let mut file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        let result = stream_to_file(&mut file, response, url, path, self.stall_timeout, on_chunk).await;
        if result.is_err() {
            drop(file);
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(path).await;
        }
        result
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file<F>(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    stall_timeout: Duration,
    mut on_chunk: F,
) -> Result<u64, DownloadError>
where
    F: FnMut(u64),
{
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    loop {
        let next = tokio::time::timeout(stall_timeout, stream.next())
            .await
            .map_err(|_| DownloadError::stalled(url, stall_timeout))?;
        let Some(chunk_result) = next else {
            break;
        };
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
        on_chunk(bytes_written);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
