//! Page fetching.

use async_trait::async_trait;
use std::time::Duration;

use crate::address::Address;
use crate::errors::FetchError;

#[cfg(feature = "http")]
pub use client::HttpFetcher;

/// Result of a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body as text.
    pub text: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// Content type from headers.
    pub content_type: Option<String>,
    /// Time taken to fetch in milliseconds.
    pub duration_ms: f64,
}

impl FetchResult {
    /// Creates a successful HTML result, mostly useful for fakes and tests.
    #[must_use]
    pub fn html(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            text: text.into(),
            final_url: url.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            duration_ms: 0.0,
        }
    }

    /// Whether the response is HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .is_some_and(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
    }

    /// Whether the fetch was successful (2xx status).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Protocol for fetching raw page content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches an address, giving up after `timeout`.
    async fn fetch(&self, address: &Address, timeout: Duration) -> Result<FetchResult, FetchError>;
}

#[cfg(feature = "http")]
mod client {
    use async_trait::async_trait;
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
    use std::time::{Duration, Instant};
    use tracing::debug;

    use super::{FetchResult, Fetcher};
    use crate::address::Address;
    use crate::config::FetchConfig;
    use crate::errors::{FetchError, RouteError};

    /// Fetcher backed by a shared `reqwest` client.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: reqwest::Client,
        config: FetchConfig,
    }

    impl HttpFetcher {
        /// Builds a fetcher with the configured user agent and headers.
        pub fn new(config: FetchConfig) -> Result<Self, RouteError> {
            let mut headers = HeaderMap::new();
            for (name, value) in &config.headers {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| RouteError::Config(format!("invalid header name '{name}': {e}")))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|e| RouteError::Config(format!("invalid header value for '{name}': {e}")))?;
                headers.insert(name, value);
            }

            let client = reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .default_headers(headers)
                .timeout(config.timeout()?)
                .build()
                .map_err(|e| RouteError::Config(format!("failed to build HTTP client: {e}")))?;

            Ok(Self { client, config })
        }

        /// Gets the configuration.
        #[must_use]
        pub fn config(&self) -> &FetchConfig {
            &self.config
        }

        fn classify(address: &Address, timeout: Duration, error: &reqwest::Error) -> FetchError {
            if error.is_timeout() {
                FetchError::timeout(address.as_str(), timeout.as_secs_f64())
            } else {
                FetchError::new(address.as_str(), error.to_string())
            }
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn fetch(&self, address: &Address, timeout: Duration) -> Result<FetchResult, FetchError> {
            let started = Instant::now();
            let limit = self.config.max_response_size;

            let response = self
                .client
                .get(address.as_str())
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| Self::classify(address, timeout, &e))?;

            let status_code = response.status().as_u16();
            if !response.status().is_success() {
                return Err(FetchError::status(address.as_str(), status_code));
            }
            if let Some(length) = response.content_length() {
                let length = usize::try_from(length).unwrap_or(usize::MAX);
                if length > limit {
                    return Err(FetchError::too_large(address.as_str(), length, limit));
                }
            }

            let final_url = response.url().to_string();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(String::from);

            let text = response
                .text()
                .await
                .map_err(|e| Self::classify(address, timeout, &e))?;
            if text.len() > limit {
                return Err(FetchError::too_large(address.as_str(), text.len(), limit));
            }

            let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
            debug!(url = %address, status_code, bytes = text.len(), duration_ms, "Fetched page");

            Ok(FetchResult {
                status_code,
                text,
                final_url,
                content_type,
                duration_ms,
            })
        }
    }

}
