//! HTTP round-trip measurement.

use crate::error::{MonitorError, MonitorResult};
use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};

/// Issues a single GET and reports how long the response took.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    async fn get(&self, url: &str) -> MonitorResult<Duration>;
}

/// `reqwest`-backed probe with a per-request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> MonitorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    /// Measures time until the response headers arrive; the body is not read.
    async fn get(&self, url: &str) -> MonitorResult<Duration> {
        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MonitorError::Timeout(self.timeout.as_millis() as u64)
            } else {
                MonitorError::Http(e)
            }
        })?;
        let elapsed = start.elapsed();
        drop(response);
        Ok(elapsed)
    }
}

/// Prefix `https://` when the URL has no http(s) scheme, then validate it.
pub fn normalize_url(raw: &str) -> MonitorResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(MonitorError::InvalidUrl(raw.to_string()));
    }

    let lower = raw.to_ascii_lowercase();
    let url = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    match Url::parse(&url) {
        Ok(parsed) if parsed.host_str().is_some() => Ok(url),
        _ => Err(MonitorError::InvalidUrl(raw.to_string())),
    }
}
