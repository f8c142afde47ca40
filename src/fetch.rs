//! HTTP access for content widgets.
//!
//! Widgets depend on the [`Fetch`] trait rather than on `reqwest` so tests can
//! script responses. [`HttpFetcher`] is the production implementation: a
//! blocking client with a request timeout, shared by all widgets.

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::widgets::WidgetError;

/// Transport-level failure of a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Blocking GET access with extra request headers.
pub trait Fetch: Send + Sync {
    fn fetch_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError>;

    fn fetch_bytes(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError>;
}

/// GET `url` and decode the body as JSON.
///
/// Transport failures become [`WidgetError::Fetch`], undecodable bodies
/// [`WidgetError::Parse`].
pub fn fetch_json<T>(
    fetch: &dyn Fetch,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<T, WidgetError>
where
    T: DeserializeOwned,
{
    let body = fetch.fetch_text(url, headers)?;
    serde_json::from_str(&body).map_err(|e| WidgetError::Parse(format!("{url}: {e}")))
}

// =============================================================================
// reqwest backend
// =============================================================================

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }

    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, FetchError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        tracing::debug!(url, "GET");
        let response = request.send().map_err(|e| classify(url, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Fetch for HttpFetcher {
    fn fetch_text(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        self.get(url, headers)?.text().map_err(|e| classify(url, &e))
    }

    fn fetch_bytes(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, FetchError> {
        let bytes = self.get(url, headers)?.bytes().map_err(|e| classify(url, &e))?;
        Ok(bytes.to_vec())
    }
}

fn classify(
    url: &str,
    error: &reqwest::Error,
) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout { url: url.to_owned() }
    } else {
        FetchError::Transport {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
