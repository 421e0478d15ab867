use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::analyze::{AnalysisResult, Analyzer, HeaderMap};
use crate::error::FetchError;
use crate::probe::target::{extract_host, normalize_url};
use crate::probe::throttle::Throttle;

/// Supplies the response headers of a URL, keyed by lowercased name.
#[async_trait]
pub trait HeaderSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<HeaderMap, FetchError>;
}

/// Converts a reqwest header map, joining repeated headers with ", ".
pub fn collect_headers(headers: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            debug!(header = %name, "skipping non-ascii header value");
            continue;
        };
        out.entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    out
}

/// Fetches headers with a GET request, retrying transport failures with
/// exponential backoff. `retries` counts attempts after the first one.
/// Optionally gated by a caller-owned [`Throttle`].
pub struct HttpHeaderSource {
    client: Client,
    retries: usize,
    backoff_initial_ms: u64,
    backoff_max_ms: u64,
    throttle: Option<Arc<Throttle>>,
}

impl HttpHeaderSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            retries: 0,
            backoff_initial_ms: 250,
            backoff_max_ms: 4_000,
            throttle: None,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries.min(10);
        self
    }

    /// Total requests made for a URL that keeps failing.
    pub fn max_attempts(&self) -> usize {
        self.retries + 1
    }

    pub fn with_throttle(mut self, throttle: Arc<Throttle>) -> Self {
        self.throttle = Some(throttle);
        self
    }

    async fn fetch_once(&self, url: &Url) -> Result<HeaderMap, FetchError> {
        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { url: url.to_string() }
            } else {
                FetchError::Transport { url: url.to_string(), source: e }
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            if let (Some(throttle), Some(host)) = (&self.throttle, extract_host(url)) {
                throttle.cool_down_host(&host, 1, 30);
            }
        }
        debug!(url = %url, status = status.as_u16(), "fetched headers");
        Ok(collect_headers(response.headers()))
    }
}

#[async_trait]
impl HeaderSource for HttpHeaderSource {
    async fn fetch(&self, url: &Url) -> Result<HeaderMap, FetchError> {
        // Permit held until the function returns.
        let _permit = match (&self.throttle, extract_host(url)) {
            (Some(throttle), Some(host)) => throttle.acquire(&host).await.ok(),
            _ => None,
        };

        let mut backoff = self.backoff_initial_ms.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(headers) => return Ok(headers),
                Err(e) if attempt >= self.max_attempts() => return Err(e),
                Err(e) => {
                    warn!(url = %url, attempt, error = %e, "header fetch failed, retrying");
                    tokio::time::sleep(Duration::from_millis(backoff.min(self.backoff_max_ms))).await;
                    backoff = backoff.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }
}

/// Normalizes `url`, fetches its headers once and analyses them.
pub async fn analyze_url(
    analyzer: &Analyzer,
    source: &dyn HeaderSource,
    url: &str,
) -> Result<AnalysisResult, FetchError> {
    let url = normalize_url(url)?;
    let headers = source.fetch(&url).await?;
    Ok(analyzer.analyze(url.as_str(), &headers))
}
