//! Core data types for audit reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Severity of a single rubric observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingStatus {
    Pass,
    Warn,
    Fail,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Warn => write!(f, "WARN"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// One human-readable observation made by a check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub status: FindingStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Remediation hint for site owners
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Finding {
    pub fn new(status: FindingStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
            hint: None,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(FindingStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(FindingStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(FindingStatus::Fail, message)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Static declaration of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckMeta {
    /// Unique identifier across the registry (e.g. `llms-txt`)
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Relative weight used by the scorer
    pub weight: u32,
}

/// Verdict of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Score in `0..=100`
    pub score: u8,
    pub findings: Vec<Finding>,
    pub duration_ms: u64,
}

impl CheckResult {
    /// Build a result for `meta`, clamping `score` into `0..=100` and
    /// measuring the duration from `start`.
    pub fn build(meta: &CheckMeta, score: i32, findings: Vec<Finding>, start: Instant) -> Self {
        Self {
            id: meta.id.to_string(),
            name: meta.name.to_string(),
            description: meta.description.to_string(),
            score: score.clamp(0, 100) as u8,
            findings,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Result standing in for a check that returned an error or panicked
    pub fn crashed(meta: &CheckMeta, reason: &str) -> Self {
        Self {
            id: meta.id.to_string(),
            name: meta.name.to_string(),
            description: meta.description.to_string(),
            score: 0,
            findings: vec![Finding::fail(format!("Check crashed: {}", reason))],
            duration_ms: 0,
        }
    }
}

/// Qualitative band for an overall score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    /// Lowest score that falls into this band
    pub min: u8,
    pub label: String,
    pub color: String,
}

impl Grade {
    pub fn new(min: u8, label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            min,
            label: label.into(),
            color: color.into(),
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Complete audit report for one site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// URL as supplied by the caller
    pub url: String,
    /// Timestamp when the report was assembled
    pub timestamp: DateTime<Utc>,
    /// Weighted overall score (0-100)
    pub overall_score: u8,
    pub grade: Grade,
    /// Per-check results in registry order
    pub results: Vec<CheckResult>,
    pub duration_ms: u64,
}

impl AuditReport {
    /// Look up the result of a check by id
    pub fn result(&self, id: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// Summary statistics for a batch of audits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub average_score: u8,
    pub grade: Grade,
}

/// Reports for several sites plus their summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchAuditReport {
    /// Reports in input URL order
    pub reports: Vec<AuditReport>,
    pub summary: BatchSummary,
    pub duration_ms: u64,
}
