//! HTTP fetch pipeline for the model repository API.
//!
//! ### Behavior
//! - Single GET per call, no automatic retry
//! - Non-2xx responses are surfaced as `HTTP_ERROR` with the status code
//! - Max redirects: 5
//! - Max body bytes: 64MB (configurable)

pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, header};
use std::time::{Duration, Instant};

pub use url::{Endpoints, UrlError, parse_base};

use bmcheck_core::Error;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "bmcheck/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 64MB)
    pub max_bytes: usize,

    /// Request timeout (default: 60s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "bmcheck/0.1".to_string(),
            max_bytes: 64 * 1024 * 1024,
            timeout: Duration::from_millis(60_000),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn from_app(config: &bmcheck_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// A successful repository response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// URL the body was served from, after redirects
    pub final_url: Url,
    pub bytes: Bytes,
}

/// HTTP client for repository requests.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Build the underlying HTTP client.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// GET `url` and return the body. Non-2xx statuses are errors.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self.http.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{url}: {e}"))
            } else {
                Error::HttpError(format!("network error: {e}"))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {}", status.as_u16(), url)));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(%url, %final_url, %content_type, elapsed_ms, bytes = bytes.len(), "fetched");

        Ok(FetchResponse { final_url, bytes })
    }

    /// Fetch a URL and decode the body as JSON.
    pub async fn get_json(&self, url: &Url) -> Result<serde_json::Value, Error> {
        let response = self.fetch(url).await?;
        serde_json::from_slice(&response.bytes)
            .map_err(|e| Error::InvalidResponse(format!("{}: body is not JSON: {}", response.final_url, e)))
    }
}
