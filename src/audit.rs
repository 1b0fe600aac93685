//! Main audit orchestration logic

use crate::check::{panic_message, Check, CheckContext};
use crate::checks;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::fetcher::Fetcher;
use crate::scoring::calculate_overall_score;
use crate::types::{AuditReport, CheckMeta, CheckResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Audit a site with the built-in checks
pub async fn audit(url: &str, config: &AuditConfig) -> Result<AuditReport> {
    audit_with(url, config, &checks::registry()).await
}

/// Audit a site with a caller-supplied check registry
///
/// Every selected check runs concurrently against one shared context. A
/// check that errors or panics is reported as a zero-score row; it never
/// fails the audit. Only malformed input (URL or configuration) is an error.
pub async fn audit_with(
    url: &str,
    config: &AuditConfig,
    registry: &[Arc<dyn Check>],
) -> Result<AuditReport> {
    let start = Instant::now();
    validate_url(url)?;
    config.validate()?;

    info!("Starting audit of: {}", url);

    let fetcher = Arc::new(Fetcher::new(&config.network)?);
    let homepage = fetcher.fetch(url).await;
    if !homepage.ok {
        warn!(
            "Homepage fetch for {} returned {}{}",
            url,
            homepage.status_label(),
            homepage
                .error
                .as_deref()
                .map(|e| format!(" ({})", e))
                .unwrap_or_default()
        );
    }

    let ctx = Arc::new(CheckContext::new(
        normalize_base_url(url),
        homepage.body,
        homepage.headers,
        Arc::clone(&fetcher),
    ));

    let selected = select_checks(registry, config.checks.as_deref());
    let metas: Vec<CheckMeta> = selected
        .iter()
        .map(|c| config.scoring.effective_meta(c.meta()))
        .collect();

    debug!("Running {} checks", selected.len());

    // Spawn every check before awaiting any of them
    let tasks: Vec<_> = selected
        .iter()
        .map(|check| {
            let check = Arc::clone(check);
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move { check.run(&ctx).await })
        })
        .collect();

    // Collect results in registry order
    let mut results = Vec::with_capacity(tasks.len());
    for (task, meta) in tasks.into_iter().zip(&metas) {
        let result = match task.await {
            Ok(Ok(result)) => {
                debug!("Check {} scored {}", meta.id, result.score);
                result
            }
            Ok(Err(e)) => {
                warn!("Check {} failed: {}", meta.id, e);
                CheckResult::crashed(meta, &e.to_string())
            }
            Err(e) => {
                let reason = if e.is_panic() {
                    panic_message(e.into_panic().as_ref())
                } else {
                    e.to_string()
                };
                warn!("Check {} crashed: {}", meta.id, reason);
                CheckResult::crashed(meta, &reason)
            }
        };
        results.push(result);
    }

    let overall_score = calculate_overall_score(&results, &metas);
    let grade = config.scoring.grades.grade_for(overall_score).clone();

    info!(
        "Audit of {} complete: {}/100 ({}), {} checks, {} urls fetched",
        url,
        overall_score,
        grade.label,
        results.len(),
        fetcher.cached_urls()
    );

    Ok(AuditReport {
        url: url.to_string(),
        timestamp: Utc::now(),
        overall_score,
        grade,
        results,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Require an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| AuditError::invalid_url(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(AuditError::invalid_url(
            url,
            format!("unsupported scheme \"{}\"", other),
        )),
    }
}

/// Strip trailing slashes so checks can append `/path` safely
pub fn normalize_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Checks whose id is in `allow` (all when `None`), in registry order
fn select_checks(registry: &[Arc<dyn Check>], allow: Option<&[String]>) -> Vec<Arc<dyn Check>> {
    registry
        .iter()
        .filter(|c| allow.map_or(true, |ids| ids.iter().any(|id| id == c.meta().id)))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Finding, FindingStatus};
    use futures::future::{BoxFuture, FutureExt};
    use std::time::Duration;

    /// Check returning a fixed score after an optional delay
    pub(crate) struct FixedCheck {
        pub meta: CheckMeta,
        pub score: i32,
        pub delay_ms: u64,
    }

    impl Check for FixedCheck {
        fn meta(&self) -> CheckMeta {
            self.meta
        }

        fn run<'a>(&'a self, _ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
            async move {
                let start = Instant::now();
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
                Ok(CheckResult::build(
                    &self.meta,
                    self.score,
                    vec![Finding::pass("fixed")],
                    start,
                ))
            }
            .boxed()
        }
    }

    struct PanickingCheck;

    impl Check for PanickingCheck {
        fn meta(&self) -> CheckMeta {
            meta("panics", 10)
        }

        fn run<'a>(&'a self, _ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
            async move { panic!("parser exploded") }.boxed()
        }
    }

    struct ErroringCheck;

    impl Check for ErroringCheck {
        fn meta(&self) -> CheckMeta {
            meta("errors", 10)
        }

        fn run<'a>(&'a self, _ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
            async move { Err(AuditError::check("errors", "unexpected document")) }.boxed()
        }
    }

    /// Check that fetches a path and passes when it is reachable
    struct FetchingCheck {
        meta: CheckMeta,
        path: &'static str,
    }

    impl Check for FetchingCheck {
        fn meta(&self) -> CheckMeta {
            self.meta
        }

        fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
            async move {
                let start = Instant::now();
                let res = ctx.fetch_path(self.path).await;
                let score = if res.ok { 100 } else { 0 };
                Ok(CheckResult::build(&self.meta, score, vec![], start))
            }
            .boxed()
        }
    }

    pub(crate) fn meta(id: &'static str, weight: u32) -> CheckMeta {
        CheckMeta {
            id,
            name: id,
            description: "test check",
            weight,
        }
    }

    pub(crate) fn fixed(id: &'static str, weight: u32, score: i32) -> Arc<dyn Check> {
        Arc::new(FixedCheck {
            meta: meta(id, weight),
            score,
            delay_ms: 0,
        })
    }

    async fn site() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_header("content-type", "text/html")
            .with_body("<html></html>")
            .create_async()
            .await;
        server
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8080/").is_ok());
        assert!(matches!(
            validate_url("example.com"),
            Err(AuditError::InvalidUrl { .. })
        ));
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://example.com/"), "https://example.com");
        assert_eq!(normalize_base_url("https://example.com//"), "https://example.com");
        assert_eq!(normalize_base_url("https://example.com/docs"), "https://example.com/docs");
    }

    #[test]
    fn test_select_checks_keeps_registry_order() {
        let registry = vec![fixed("a", 1, 0), fixed("b", 1, 0), fixed("c", 1, 0)];

        let all = select_checks(&registry, None);
        assert_eq!(all.len(), 3);

        let allow = vec!["c".to_string(), "a".to_string(), "zzz".to_string()];
        let ids: Vec<&str> = select_checks(&registry, Some(&allow))
            .iter()
            .map(|c| c.meta().id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_failing_checks_are_isolated() {
        let server = site().await;
        let registry: Vec<Arc<dyn Check>> = vec![
            fixed("first", 10, 80),
            Arc::new(PanickingCheck),
            Arc::new(ErroringCheck),
            fixed("last", 10, 100),
        ];

        let report = audit_with(&server.url(), &AuditConfig::default(), &registry)
            .await
            .unwrap();

        assert_eq!(report.results.len(), 4);
        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "panics", "errors", "last"]);

        let panicked = report.result("panics").unwrap();
        assert_eq!(panicked.score, 0);
        assert_eq!(panicked.duration_ms, 0);
        assert_eq!(panicked.findings.len(), 1);
        assert_eq!(panicked.findings[0].status, FindingStatus::Fail);
        assert!(panicked.findings[0].message.contains("parser exploded"));

        let errored = report.result("errors").unwrap();
        assert_eq!(errored.score, 0);
        assert!(errored.findings[0].message.contains("unexpected document"));

        assert_eq!(report.result("first").unwrap().score, 80);
        assert_eq!(report.result("last").unwrap().score, 100);
        // (0.8*10 + 0 + 0 + 1.0*10) / 40
        assert_eq!(report.overall_score, 45);
        assert_eq!(report.grade.label, "Poor");
    }

    #[tokio::test]
    async fn test_results_follow_registry_order_not_completion_order() {
        let server = site().await;
        let registry: Vec<Arc<dyn Check>> = vec![
            Arc::new(FixedCheck {
                meta: meta("slow", 1),
                score: 10,
                delay_ms: 150,
            }),
            Arc::new(FixedCheck {
                meta: meta("fast", 1),
                score: 20,
                delay_ms: 0,
            }),
        ];

        let started = Instant::now();
        let report = audit_with(&server.url(), &AuditConfig::default(), &registry)
            .await
            .unwrap();

        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["slow", "fast"]);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_checks_run_concurrently() {
        let server = site().await;
        let registry: Vec<Arc<dyn Check>> = (0..4)
            .map(|i| {
                let id: &'static str = ["w", "x", "y", "z"][i];
                Arc::new(FixedCheck {
                    meta: meta(id, 1),
                    score: 100,
                    delay_ms: 300,
                }) as Arc<dyn Check>
            })
            .collect();

        let report = audit_with(&server.url(), &AuditConfig::default(), &registry)
            .await
            .unwrap();

        assert_eq!(report.overall_score, 100);
        assert!(report.duration_ms < 1200, "took {} ms", report.duration_ms);
    }

    #[tokio::test]
    async fn test_shared_resources_are_fetched_once() {
        let mut server = site().await;
        let llms = server
            .mock("GET", "/llms.txt")
            .with_body("# Site")
            .expect(1)
            .create_async()
            .await;
        let registry: Vec<Arc<dyn Check>> = vec![
            Arc::new(FetchingCheck {
                meta: meta("one", 1),
                path: "/llms.txt",
            }),
            Arc::new(FetchingCheck {
                meta: meta("two", 1),
                path: "/llms.txt",
            }),
        ];

        // Trailing slash must not produce "//llms.txt"
        let url = format!("{}/", server.url());
        let report = audit_with(&url, &AuditConfig::default(), &registry)
            .await
            .unwrap();

        llms.assert_async().await;
        assert_eq!(report.url, url);
        assert_eq!(report.overall_score, 100);
    }

    #[tokio::test]
    async fn test_homepage_is_fetched_once_and_shared() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("GET", "/")
            .with_header("x-frame-options", "DENY")
            .with_body("<html><title>Home</title></html>")
            .expect(1)
            .create_async()
            .await;

        let registry = checks::registry();
        let config = AuditConfig::builder()
            .checks(["structured-data", "meta-tags", "http-headers"])
            .build();
        let report = audit_with(&server.url(), &config, &registry).await.unwrap();

        home.assert_async().await;
        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["structured-data", "meta-tags", "http-headers"]);
    }

    #[tokio::test]
    async fn test_subset_is_renormalized_with_overrides() {
        let server = site().await;
        let registry = vec![fixed("heavy", 90, 100), fixed("light", 10, 0)];

        let config = AuditConfig::builder().checks(["heavy"]).build();
        let report = audit_with(&server.url(), &config, &registry).await.unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.overall_score, 100);
        assert_eq!(report.grade.label, "Excellent");

        let mut config = AuditConfig::default();
        config.scoring.weight_overrides.insert("light".to_string(), 90);
        config.scoring.weight_overrides.insert("heavy".to_string(), 10);
        let report = audit_with(&server.url(), &config, &registry).await.unwrap();
        assert_eq!(report.overall_score, 10);
    }

    #[tokio::test]
    async fn test_unreachable_site_still_reports() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let report = audit(&format!("http://{}", addr), &AuditConfig::default())
            .await
            .unwrap();

        assert_eq!(report.results.len(), checks::ids().len());
        assert_eq!(report.overall_score, 0);
        assert_eq!(report.grade.label, "Poor");
        assert!(report
            .results
            .iter()
            .all(|r| r.findings.iter().any(|f| f.status == FindingStatus::Fail)));
    }

    #[tokio::test]
    async fn test_empty_selection_scores_zero() {
        let server = site().await;
        let config = AuditConfig::builder().checks(Vec::<String>::new()).build();

        let report = audit_with(&server.url(), &config, &[fixed("a", 1, 100)])
            .await
            .unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.overall_score, 0);
    }

    #[tokio::test]
    async fn test_malformed_input_is_rejected() {
        assert!(audit("not a url", &AuditConfig::default()).await.is_err());

        let config = AuditConfig::builder().timeout_ms(0).build();
        assert!(matches!(
            audit("https://example.com", &config).await,
            Err(AuditError::ConfigError(_))
        ));
    }
}
