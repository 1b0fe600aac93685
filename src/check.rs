//! The contract every audit check satisfies

use crate::error::Result;
use crate::fetcher::{FetchResponse, Fetcher};
use crate::types::{CheckMeta, CheckResult};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A stateless rule evaluator for one compliance dimension
///
/// Implementations report content problems (missing files, invalid JSON)
/// as findings with a reduced score and clamp that score into `0..=100`.
/// An `Err` or a panic is treated by the orchestrator as a crash of this
/// check alone.
pub trait Check: Send + Sync {
    /// Static declaration: id, display name, description, weight
    fn meta(&self) -> CheckMeta;

    /// Evaluate the site described by `ctx`
    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>>;
}

/// Read-only view of the audited site shared by all checks of one audit
#[derive(Debug)]
pub struct CheckContext {
    url: String,
    html: String,
    headers: BTreeMap<String, String>,
    fetcher: Arc<Fetcher>,
}

impl CheckContext {
    /// `url` is the base URL without a trailing slash
    pub fn new(
        url: impl Into<String>,
        html: impl Into<String>,
        headers: BTreeMap<String, String>,
        fetcher: Arc<Fetcher>,
    ) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            headers,
            fetcher,
        }
    }

    /// Base URL of the audited site, never ending in `/`
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Homepage body
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Homepage headers keyed by lower-case name
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Fetch an absolute URL through the audit's cache
    pub async fn fetch(&self, url: &str) -> FetchResponse {
        self.fetcher.fetch(url).await
    }

    /// Fetch a path (starting with `/`) relative to the base URL
    pub async fn fetch_path(&self, path: &str) -> FetchResponse {
        self.fetch(&format!("{}{}", self.url, path)).await
    }
}

/// Extract a readable message from a panicked check task
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::types::{Finding, FindingStatus};
    use std::time::Instant;

    const META: CheckMeta = CheckMeta {
        id: "sample",
        name: "Sample",
        description: "Sample check",
        weight: 5,
    };

    #[test]
    fn test_build_clamps_score() {
        let start = Instant::now();
        assert_eq!(CheckResult::build(&META, 130, vec![], start).score, 100);
        assert_eq!(CheckResult::build(&META, -20, vec![], start).score, 0);
        assert_eq!(CheckResult::build(&META, 55, vec![], start).score, 55);
    }

    #[test]
    fn test_crashed_result_names_the_check() {
        let result = CheckResult::crashed(&META, "boom");
        assert_eq!(result.id, "sample");
        assert_eq!(result.name, "Sample");
        assert_eq!(result.description, "Sample check");
        assert_eq!(result.score, 0);
        assert_eq!(result.duration_ms, 0);
        assert_eq!(
            result.findings,
            vec![Finding::fail("Check crashed: boom")]
        );
        assert_eq!(result.findings[0].status, FindingStatus::Fail);
    }

    #[test]
    fn test_panic_message_variants() {
        let static_str: Box<dyn std::any::Any + Send> = Box::new("static");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn std::any::Any + Send> = Box::new(42u32);

        assert_eq!(panic_message(static_str.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "Unknown error");
    }

    #[test]
    fn test_context_header_lookup_is_case_insensitive() {
        let fetcher = Arc::new(Fetcher::new(&NetworkConfig::default()).unwrap());
        let mut headers = BTreeMap::new();
        headers.insert("link".to_string(), "</llms.txt>; rel=alternate".to_string());
        let ctx = CheckContext::new("https://example.com", "<html></html>", headers, fetcher);

        assert_eq!(ctx.url(), "https://example.com");
        assert_eq!(ctx.header("Link"), Some("</llms.txt>; rel=alternate"));
        assert!(ctx.header("x-frame-options").is_none());
    }
}
