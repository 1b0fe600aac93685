//! Rendering audit reports as JSON, Markdown, HTML or colored terminal text

mod html;

pub use html::{render_batch_html, render_html};

use crate::error::Result;
use crate::types::{AuditReport, BatchAuditReport, CheckResult, FindingStatus};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

/// Output format accepted by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Markdown,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Pretty JSON of a single or batch report
pub fn render_json<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_markdown(report: &AuditReport) -> String {
    let mut md = String::new();
    write_markdown_report(&mut md, report, 1);
    md
}

/// Append one report whose title is a heading of `level`; sections sit one level below
fn write_markdown_report(md: &mut String, report: &AuditReport, level: usize) {
    let title = "#".repeat(level);
    let section = "#".repeat(level + 1);

    let _ = writeln!(md, "{} AI Readiness Report: {}\n", title, report.url);
    let _ = writeln!(md, "**Generated:** {}\n", report.timestamp.to_rfc3339());
    let _ = writeln!(
        md,
        "**Overall score:** {}/100 ({})\n",
        report.overall_score, report.grade.label
    );
    let _ = writeln!(md, "**Duration:** {} ms\n", report.duration_ms);

    let _ = writeln!(md, "{} Summary\n", section);
    md.push_str("| Check | Score | Pass | Warn | Fail |\n");
    md.push_str("|-------|-------|------|------|------|\n");
    for result in &report.results {
        let (pass, warn, fail) = status_counts(result);
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {} |",
            result.name, result.score, pass, warn, fail
        );
    }

    for result in &report.results {
        let _ = writeln!(md, "\n{} {} ({}/100)\n", section, result.name, result.score);
        let _ = writeln!(md, "_{}_\n", result.description);
        for finding in &result.findings {
            let _ = writeln!(md, "- **{}** {}", finding.status, finding.message);
            if let Some(detail) = &finding.detail {
                let _ = writeln!(md, "  - {}", detail);
            }
            if let Some(hint) = &finding.hint {
                let _ = writeln!(md, "  - Hint: {}", hint);
            }
        }
    }
}

pub fn render_batch_markdown(batch: &BatchAuditReport) -> String {
    let mut md = String::new();
    let summary = &batch.summary;

    md.push_str("# AI Readiness Batch Report\n\n");
    md.push_str("## Summary\n\n");
    let _ = writeln!(md, "- Sites audited: {}", summary.total);
    let _ = writeln!(md, "- Passed: {}", summary.passed);
    let _ = writeln!(md, "- Failed: {}", summary.failed);
    let _ = writeln!(
        md,
        "- Average score: {} ({})",
        summary.average_score, summary.grade.label
    );
    let _ = writeln!(md, "- Duration: {} ms\n", batch.duration_ms);

    md.push_str("| URL | Score | Grade |\n");
    md.push_str("|-----|-------|-------|\n");
    for report in &batch.reports {
        let _ = writeln!(
            md,
            "| {} | {} | {} |",
            report.url, report.overall_score, report.grade.label
        );
    }

    for report in &batch.reports {
        md.push('\n');
        write_markdown_report(&mut md, report, 2);
    }

    md
}

pub fn render_terminal(report: &AuditReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", "=== AI Readiness Audit ===".bold());
    let _ = writeln!(out, "URL: {}", report.url.cyan());
    let _ = writeln!(
        out,
        "Score: {} {} {}",
        score_bar(report.overall_score, &report.grade.color),
        format!("{}/100", report.overall_score).bold(),
        paint(&report.grade.label, &report.grade.color).bold()
    );

    for result in &report.results {
        let _ = writeln!(
            out,
            "\n{} {} ({} ms)",
            result.name.bold(),
            score_label(result.score),
            result.duration_ms
        );
        for finding in &result.findings {
            let tag = match finding.status {
                FindingStatus::Pass => finding.status.to_string().green(),
                FindingStatus::Warn => finding.status.to_string().yellow(),
                FindingStatus::Fail => finding.status.to_string().red(),
            };
            let _ = writeln!(out, "  [{}] {}", tag, finding.message);
            if let Some(detail) = &finding.detail {
                let _ = writeln!(out, "         {}", detail.dimmed());
            }
            if let Some(hint) = &finding.hint {
                let _ = writeln!(out, "         Hint: {}", hint.italic());
            }
        }
    }

    let _ = writeln!(out, "\nCompleted in {} ms", report.duration_ms);
    out
}

pub fn render_batch_terminal(batch: &BatchAuditReport) -> String {
    let mut out = String::new();
    let summary = &batch.summary;

    let _ = writeln!(out, "\n{}", "=== AI Readiness Batch Audit ===".bold());
    for report in &batch.reports {
        let _ = writeln!(
            out,
            "  {} {:>3} {}  {}",
            score_bar(report.overall_score, &report.grade.color),
            report.overall_score,
            paint(&format!("{:<9}", report.grade.label), &report.grade.color),
            report.url
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Sites audited: {}", summary.total);
    let _ = writeln!(
        out,
        "  {} {}",
        "●".green(),
        format!("Passed: {}", summary.passed).green()
    );
    let _ = writeln!(
        out,
        "  {} {}",
        "●".red(),
        format!("Failed: {}", summary.failed).red()
    );
    let _ = writeln!(
        out,
        "Average score: {} ({})",
        summary.average_score,
        paint(&summary.grade.label, &summary.grade.color)
    );
    let _ = writeln!(out, "\nCompleted in {} ms", batch.duration_ms);
    out
}

fn status_counts(result: &CheckResult) -> (usize, usize, usize) {
    result
        .findings
        .iter()
        .fold((0, 0, 0), |(p, w, f), finding| match finding.status {
            FindingStatus::Pass => (p + 1, w, f),
            FindingStatus::Warn => (p, w + 1, f),
            FindingStatus::Fail => (p, w, f + 1),
        })
}

/// Apply a grade color name to `text`
fn paint(text: &str, color: &str) -> ColoredString {
    match color {
        "green" => text.green(),
        "yellow" => text.yellow(),
        "orange" => text.truecolor(255, 165, 0),
        "red" => text.red(),
        _ => text.normal(),
    }
}

fn score_label(score: u8) -> ColoredString {
    let text = format!("{}/100", score);
    match score {
        70..=100 => text.green(),
        50..=69 => text.yellow(),
        _ => text.red(),
    }
}

fn score_bar(score: u8, color: &str) -> String {
    let filled = (usize::from(score.min(100)) * BAR_WIDTH + 50) / 100;
    format!(
        "{}{}",
        paint(&"█".repeat(filled), color),
        "░".repeat(BAR_WIDTH - filled).dimmed()
    )
}
