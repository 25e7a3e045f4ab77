//! HTTP client wrapper shared by discovery and downloads.
//!
//! One pooled client is created per run and reused across every request.
//! Non-success statuses and timeouts are mapped into [`DownloadError`]
//! here so callers never inspect raw reqwest errors.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, ClientBuilder, Response};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;

/// Connection establishment timeout.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Whole-request timeout, generous enough for large attachment scans.
const READ_TIMEOUT_SECS: u64 = 300;

/// Identifying User-Agent sent with every request.
const USER_AGENT: &str = concat!("peraturan-dl/", env!("CARGO_PKG_VERSION"));

/// HTTP client for listing pages and document downloads.
///
/// Designed to be created once and cloned cheaply; the inner reqwest
/// client pools connections to the single catalog host.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with the default timeouts (30 s connect, 300 s
    /// read) and gzip decompression.
    ///
    /// # Panics
    ///
    /// Panics if the reqwest builder rejects the static configuration,
    /// which cannot happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit timeout values (seconds).
    ///
    /// # Panics
    ///
    /// Panics if the reqwest builder rejects the configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches a listing page as text.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ServerStatus`] for non-success responses,
    /// [`DownloadError::Timeout`] for timeouts, and
    /// [`DownloadError::Transport`] for other network failures.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<String, DownloadError> {
        let response = self.get(url).await?;
        debug!(status = response.status().as_u16(), "page fetched");
        response
            .text()
            .await
            .map_err(|e| map_reqwest_error(url, e))
    }

    /// Issues a GET and checks the response status.
    ///
    /// The response body is left unread so callers can stream it.
    ///
    /// # Errors
    ///
    /// Same mapping as [`HttpClient::fetch_page`]; a 429 response carries
    /// its Retry-After header value in the error.
    pub async fn get(&self, url: &Url) -> Result<Response, DownloadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(DownloadError::server_status_with_retry_after(
                url.as_str(),
                status.as_u16(),
                retry_after,
            ));
        }
        Ok(response)
    }
}

fn map_reqwest_error(url: &Url, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url.as_str())
    } else {
        DownloadError::transport(url.as_str(), error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cari"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = Url::parse(&format!("{}/cari", server.uri())).unwrap();
        let body = client.fetch_page(&url).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_page_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = Url::parse(&format!("{}/cari", server.uri())).unwrap();
        match client.fetch_page(&url).await {
            Err(DownloadError::ServerStatus { status, .. }) => assert_eq!(status, 503),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_429_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = Url::parse(&format!("{}/files/uu.pdf", server.uri())).unwrap();
        match client.get(&url).await {
            Err(DownloadError::ServerStatus {
                status,
                retry_after,
                ..
            }) => {
                assert_eq!(status, 429);
                assert_eq!(retry_after.as_deref(), Some("7"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_success_leaves_body_unread() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = Url::parse(&format!("{}/files/uu.pdf", server.uri())).unwrap();
        let response = client.get(&url).await.unwrap();
        let bytes = response.bytes().await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-1.4");
    }
}
