// src/fetch.rs
//! Resilient page fetching. Retry is an explicit policy value injected into
//! the fetcher so the orchestrator never sleeps on its own.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.9";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transient — retried within the run.
    #[error("timeout fetching {url}")]
    Timeout { url: String },
    /// Permanent — the section is abandoned for this run.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    /// Permanent — connection or protocol failure.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    /// Delay before the retry following failed attempt `attempt` (1-based):
    /// base, 2*base, 3*base, ...
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// Real fetcher over reqwest. Browser-like headers are set per request;
/// only timeouts are retried.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client: Client::new(),
            timeout,
            retry,
        }
    }

    pub fn from_config(cfg: &crate::config::FetchConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.timeout_secs),
            RetryPolicy::new(cfg.max_attempts, Duration::from_secs(cfg.backoff_base_secs)),
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, UA)
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANG)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        if let Err(e) = resp.error_for_status_ref() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            });
        }
        resp.text().await.map_err(|e| classify(url, e))
    }
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff_for(attempt);
                    tracing::debug!(url, attempt, delay_secs = delay.as_secs(), "retrying after timeout");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
