//! # ax_audit
//!
//! Audits a website for AI agent readiness, providing insights into:
//! - **Discovery files**: `llms.txt`, A2A agent cards, MCP and OpenAPI documents
//! - **Crawler policy**: how `robots.txt` treats the known AI crawlers
//! - **Markup**: JSON-LD structured data, AI meta tags and discovery links
//! - **Transport**: security headers, `Link` headers and CORS
//!
//! ## Quick Start
//!
//! ```no_run
//! use ax_audit::{audit, AuditConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AuditConfig::default();
//! let report = audit("https://example.com", &config).await?;
//!
//! println!("{}: {}/100 ({})", report.url, report.overall_score, report.grade);
//! for result in &report.results {
//!     println!("  {}: {}", result.name, result.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - Checks run concurrently and share one memoizing fetcher per audit
//! - A failing check is reported as a zero-score row, never an aborted audit
//! - Weighted scoring renormalized over the checks actually run
//! - Batch audits of many sites with a pass/fail summary
//! - CLI tool with terminal, JSON, Markdown and HTML output

mod audit;
mod batch;
mod check;
pub mod checks;
mod config;
mod error;
mod fetcher;
pub mod report;
mod scoring;
mod types;

// Re-export public API
pub use audit::{audit, audit_with, normalize_base_url, validate_url};
pub use batch::{batch_audit, batch_audit_with, summarize};
pub use check::{Check, CheckContext};
pub use config::{AuditConfig, AuditConfigBuilder, GradeScale, NetworkConfig, ScoringConfig, DEFAULT_USER_AGENT};
pub use error::{AuditError, Result};
pub use fetcher::{FetchResponse, Fetcher};
pub use report::OutputFormat;
pub use scoring::{average_score, calculate_overall_score, get_grade};
pub use types::{
    AuditReport, BatchAuditReport, BatchSummary, CheckMeta, CheckResult, Finding, FindingStatus,
    Grade,
};
