//! Single-shot HTTP GET with a bounded timeout.
//!
//! The client never retries: a connection failure, a timeout, or a non-2xx
//! status is returned as [`EtlError::Network`] and ends the run.

use crate::error::{EtlError, Result};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("country-gdp-etl/", env!("CARGO_PKG_VERSION"));

/// A successful page fetch.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Thin wrapper around `reqwest::Client` with the run's timeout baked in.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EtlError::network("(client setup)", e))?;
        Ok(Self { inner, timeout })
    }

    /// GET `url` and return the body of a 2xx response.
    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        let parsed = url::Url::parse(url).map_err(|e| EtlError::Network {
            url: url.to_string(),
            reason: format!("invalid URL: {e}"),
            source: None,
        })?;

        debug!("GET {parsed} (timeout {:?})", self.timeout);
        let resp = self
            .inner
            .get(parsed)
            .send()
            .await
            .map_err(|e| EtlError::network(url, e))?
            .error_for_status()
            .map_err(|e| EtlError::network(url, e))?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = resp.text().await.map_err(|e| EtlError::network(url, e))?;
        debug!("received {} bytes from {final_url} ({status})", body.len());

        Ok(HttpResponse {
            url: final_url,
            status,
            content_type,
            body,
        })
    }

    /// GET `url` and return only the body text.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url).await?.body)
    }
}
