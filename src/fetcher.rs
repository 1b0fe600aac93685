//! Memoizing HTTP fetcher for audited resources

use crate::config::NetworkConfig;
use crate::error::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

const ACCEPT_TYPES: &str = "text/html, application/json, text/plain, */*";
const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Outcome of fetching one URL
///
/// Transport failures are encoded as `status == 0`, `ok == false` and an
/// `error` message; they are never returned as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Response headers keyed by lower-case name
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// True for 2xx responses
    pub ok: bool,
    /// Final URL after redirects
    pub url: String,
    pub error: Option<String>,
}

impl FetchResponse {
    fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            status: 0,
            headers: BTreeMap::new(),
            body: String::new(),
            ok: false,
            url: url.to_string(),
            error: Some(error.into()),
        }
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Short description of the status for findings
    pub fn status_label(&self) -> String {
        if self.status == 0 {
            "HTTP network error".to_string()
        } else {
            format!("HTTP {}", self.status)
        }
    }
}

/// HTTP fetcher that caches every outcome per URL for its own lifetime
///
/// Concurrent requests for the same URL share one in-flight request.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    cache: Mutex<HashMap<String, Arc<OnceCell<FetchResponse>>>>,
}

impl Fetcher {
    /// Build a fetcher from network configuration
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_TYPES));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Fetch `url`, serving repeated requests from the cache
    pub async fn fetch(&self, url: &str) -> FetchResponse {
        let cell = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(url.to_string()).or_default())
        };

        if let Some(cached) = cell.get() {
            debug!("cache hit: {}", url);
            return cached.clone();
        }

        cell.get_or_init(|| self.fetch_uncached(url)).await.clone()
    }

    /// Number of distinct URLs requested so far
    pub fn cached_urls(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn fetch_uncached(&self, url: &str) -> FetchResponse {
        debug!("fetch: {}", url);

        let response = match tokio::time::timeout(self.timeout, self.request(url)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                let message = if e.is_timeout() {
                    TIMEOUT_MESSAGE.to_string()
                } else {
                    e.to_string()
                };
                warn!("fetch failed for {}: {}", url, message);
                FetchResponse::failed(url, message)
            }
            Err(_) => {
                warn!("fetch timed out for {} after {:?}", url, self.timeout);
                FetchResponse::failed(url, TIMEOUT_MESSAGE)
            }
        };

        debug!(
            "  {} {} ({} bytes)",
            response.status,
            response.url,
            response.body.len()
        );
        response
    }

    async fn request(&self, url: &str) -> std::result::Result<FetchResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = normalize_headers(response.headers());
        let body = response.text().await?;

        Ok(FetchResponse {
            status: status.as_u16(),
            headers,
            body,
            ok: status.is_success(),
            url: final_url,
            error: None,
        })
    }
}

/// Lower-case header names, joining repeated headers with ", "
fn normalize_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut normalized: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        normalized
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    normalized
}
