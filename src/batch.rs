//! Auditing several sites at once

use crate::audit::{audit_with, validate_url};
use crate::check::Check;
use crate::checks;
use crate::config::{AuditConfig, ScoringConfig};
use crate::error::Result;
use crate::scoring::average_score;
use crate::types::{AuditReport, BatchAuditReport, BatchSummary};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Audit every URL concurrently with the built-in checks
pub async fn batch_audit(urls: &[String], config: &AuditConfig) -> Result<BatchAuditReport> {
    batch_audit_with(urls, config, &checks::registry()).await
}

/// Audit every URL concurrently with a caller-supplied registry
///
/// All URLs are validated before any network traffic; one malformed URL
/// rejects the whole batch. Reports come back in input order.
pub async fn batch_audit_with(
    urls: &[String],
    config: &AuditConfig,
    registry: &[Arc<dyn Check>],
) -> Result<BatchAuditReport> {
    let start = Instant::now();
    for url in urls {
        validate_url(url)?;
    }
    config.validate()?;

    info!("Starting batch audit of {} sites", urls.len());

    let futures = urls.iter().map(|url| audit_with(url, config, registry));
    let reports = join_all(futures)
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let summary = summarize(&reports, &config.scoring);
    info!(
        "Batch complete: {}/{} passed, average {}",
        summary.passed, summary.total, summary.average_score
    );

    Ok(BatchAuditReport {
        reports,
        summary,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Pass/fail counts, mean score and grade over a set of reports
pub fn summarize(reports: &[AuditReport], scoring: &ScoringConfig) -> BatchSummary {
    let scores: Vec<u8> = reports.iter().map(|r| r.overall_score).collect();
    let passed = scores.iter().filter(|&&s| scoring.passes(s)).count();
    let average = average_score(&scores);

    BatchSummary {
        total: reports.len(),
        passed,
        failed: reports.len() - passed,
        average_score: average,
        grade: scoring.grades.grade_for(average).clone(),
    }
}
