//! Self-contained HTML pages for single and batch reports

use crate::scoring::get_grade;
use crate::types::{AuditReport, BatchAuditReport, CheckResult, Finding, FindingStatus, Grade};
use std::f64::consts::PI;
use std::fmt::Write;

const GAUGE_RADIUS: f64 = 54.0;
const HSL_GREEN: &str = "hsl(140, 70%, 45%)";
const HSL_YELLOW: &str = "hsl(45, 90%, 48%)";
const HSL_ORANGE: &str = "hsl(25, 90%, 50%)";
const HSL_RED: &str = "hsl(0, 80%, 50%)";

const STYLE: &str = r#"
:root { --bg: #fff; --card: #f8f9fa; --text: #1a1a2e; --muted: #666; --border: #e0e0e0; --gauge-bg: #e9ecef; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #0d1117; --card: #161b22; --text: #e6edf3; --muted: #8b949e; --border: #30363d; --gauge-bg: #21262d; }
}
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; background: var(--bg); color: var(--text); line-height: 1.6; padding: 2rem; max-width: 900px; margin: 0 auto; }
header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
header p, .meta, .check-desc, .finding-detail, .finding-hint, .stat-label, footer { color: var(--muted); }
a { color: var(--text); }
.report { margin-bottom: 2.5rem; }
.report-header, .batch-stats { display: flex; align-items: center; gap: 2rem; margin-bottom: 1.5rem; }
.meta { display: flex; gap: 1.5rem; font-size: 0.85rem; }
.gauge { position: relative; flex-shrink: 0; }
.gauge svg { width: 100%; height: 100%; }
.gauge-text { position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); text-align: center; }
.gauge-score { display: block; font-size: 2rem; font-weight: 700; line-height: 1; }
.gauge-label { font-size: 0.75rem; }
.check { background: var(--card); border: 1px solid var(--border); border-radius: 8px; margin-bottom: 0.75rem; }
.check summary { padding: 0.75rem 1rem; cursor: pointer; }
.check-header { display: inline-flex; justify-content: space-between; width: calc(100% - 1.5rem); }
.check-name, .check-score { font-weight: 700; }
.check-desc { font-size: 0.8rem; }
.check-findings { padding: 0 1rem 0.75rem; }
.finding { display: flex; gap: 0.5rem; padding: 0.4rem 0.5rem; font-size: 0.85rem; }
.finding-content { display: flex; flex-direction: column; }
.finding-detail, .finding-hint { font-size: 0.75rem; }
.finding-hint { font-style: italic; }
.icon { font-weight: 700; width: 1.2rem; text-align: center; }
.icon.pass { color: hsl(140, 70%, 45%); }
.icon.warn { color: hsl(45, 90%, 48%); }
.icon.fail { color: hsl(0, 80%, 50%); }
.batch-summary { margin-bottom: 2.5rem; padding: 1.5rem; background: var(--card); border: 1px solid var(--border); border-radius: 8px; }
.batch-info { display: flex; gap: 1.5rem; }
.stat { display: flex; flex-direction: column; align-items: center; }
.stat-value { font-size: 1.5rem; font-weight: 700; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { padding: 0.5rem 0.75rem; text-align: left; border-bottom: 1px solid var(--border); }
.badge { font-size: 0.7rem; font-weight: 600; padding: 0.15rem 0.5rem; border-radius: 3px; }
.badge-pass { background: hsl(140, 70%, 90%); color: hsl(140, 70%, 30%); }
.badge-fail { background: hsl(0, 80%, 92%); color: hsl(0, 80%, 35%); }
footer { margin-top: 2rem; padding-top: 1rem; border-top: 1px solid var(--border); font-size: 0.8rem; text-align: center; }
"#;

pub fn render_html(report: &AuditReport) -> String {
    let mut body = String::new();
    write_report(&mut body, report);
    page(&format!("AX Audit: {}", report.url), &body)
}

/// Batch page: summary table followed by every site's report
///
/// Sites scoring at or above `pass_threshold` get a PASS badge.
pub fn render_batch_html(batch: &BatchAuditReport, pass_threshold: u8) -> String {
    let summary = &batch.summary;
    let mut body = String::new();

    let mut rows = String::new();
    for report in &batch.reports {
        let color = grade_hsl(&report.grade);
        let (class, label) = if report.overall_score >= pass_threshold {
            ("badge-pass", "PASS")
        } else {
            ("badge-fail", "FAIL")
        };
        let url = escape_html(&report.url);
        let _ = write!(
            rows,
            r#"<tr><td><a href="{url}" target="_blank" rel="noopener">{url}</a></td><td style="color:{color};font-weight:600">{score}/100</td><td style="color:{color}">{grade}</td><td><span class="badge {class}">{label}</span></td></tr>"#,
            url = url,
            color = color,
            score = report.overall_score,
            grade = escape_html(&report.grade.label),
            class = class,
            label = label,
        );
    }

    let failed = if summary.failed > 0 {
        format!(
            r#"<div class="stat"><span class="stat-value" style="color:{}">{}</span><span class="stat-label">Failed</span></div>"#,
            HSL_RED, summary.failed
        )
    } else {
        String::new()
    };
    let avg_color = grade_hsl(&summary.grade);

    let _ = write!(
        body,
        r#"<section class="batch-summary"><h2>Batch Summary</h2><div class="batch-stats">{gauge}<div class="batch-info"><div class="stat"><span class="stat-value">{total}</span><span class="stat-label">URLs</span></div><div class="stat"><span class="stat-value" style="color:{green}">{passed}</span><span class="stat-label">Passed</span></div>{failed}<div class="stat"><span class="stat-value">{duration}ms</span><span class="stat-label">Total</span></div></div></div><table><thead><tr><th>URL</th><th>Score</th><th>Grade</th><th>Status</th></tr></thead><tbody>{rows}</tbody><tfoot><tr><td><strong>Average</strong></td><td style="color:{avg_color};font-weight:600">{avg}/100</td><td style="color:{avg_color}">{avg_grade}</td><td></td></tr></tfoot></table></section>"#,
        gauge = gauge(summary.average_score, &summary.grade, 120),
        total = summary.total,
        green = HSL_GREEN,
        passed = summary.passed,
        failed = failed,
        duration = batch.duration_ms,
        rows = rows,
        avg_color = avg_color,
        avg = summary.average_score,
        avg_grade = escape_html(&summary.grade.label),
    );

    for report in &batch.reports {
        write_report(&mut body, report);
    }

    page(
        &format!("AX Audit: Batch Report ({} URLs)", summary.total),
        &body,
    )
}

/// Map a grade's color name onto the page palette
fn grade_hsl(grade: &Grade) -> &'static str {
    match grade.color.as_str() {
        "green" => HSL_GREEN,
        "yellow" => HSL_YELLOW,
        "orange" => HSL_ORANGE,
        _ => HSL_RED,
    }
}

/// Escape text for use in element content and double-quoted attributes
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn status_icon(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Pass => r#"<span class="icon pass">&#10003;</span>"#,
        FindingStatus::Warn => r#"<span class="icon warn">&#9888;</span>"#,
        FindingStatus::Fail => r#"<span class="icon fail">&#10007;</span>"#,
    }
}

/// Circular score gauge; the arc covers `score` percent of the circle
fn gauge(score: u8, grade: &Grade, size: u32) -> String {
    let color = grade_hsl(grade);
    let circumference = 2.0 * PI * GAUGE_RADIUS;
    let offset = circumference - f64::from(score.min(100)) / 100.0 * circumference;

    format!(
        r#"<div class="gauge" style="width:{size}px;height:{size}px"><svg viewBox="0 0 120 120"><circle cx="60" cy="60" r="54" fill="none" stroke="var(--gauge-bg)" stroke-width="8"/><circle cx="60" cy="60" r="54" fill="none" stroke="{color}" stroke-width="8" stroke-dasharray="{circumference:.2}" stroke-dashoffset="{offset:.2}" stroke-linecap="round" transform="rotate(-90 60 60)"/></svg><div class="gauge-text"><span class="gauge-score" style="color:{color}">{score}</span><span class="gauge-label">{label}</span></div></div>"#,
        size = size,
        color = color,
        circumference = circumference,
        offset = offset,
        score = score,
        label = escape_html(&grade.label),
    )
}

fn write_finding(out: &mut String, finding: &Finding) {
    let _ = write!(
        out,
        r#"<div class="finding {}">{}<div class="finding-content"><span class="finding-msg">{}</span>"#,
        finding.status.to_string().to_lowercase(),
        status_icon(finding.status),
        escape_html(&finding.message)
    );
    if let Some(detail) = &finding.detail {
        let _ = write!(out, r#"<span class="finding-detail">{}</span>"#, escape_html(detail));
    }
    if let Some(hint) = &finding.hint {
        let _ = write!(out, r#"<span class="finding-hint">Hint: {}</span>"#, escape_html(hint));
    }
    out.push_str("</div></div>");
}

fn write_check(out: &mut String, result: &CheckResult) {
    let color = grade_hsl(&get_grade(result.score));
    let _ = write!(
        out,
        r#"<details class="check" open><summary><div class="check-header"><span class="check-name">{}</span><span class="check-score" style="color:{}">{}/100</span></div><div class="check-desc">{}</div></summary><div class="check-findings">"#,
        escape_html(&result.name),
        color,
        result.score,
        escape_html(&result.description)
    );
    for finding in &result.findings {
        write_finding(out, finding);
    }
    out.push_str("</div></details>");
}

fn write_report(out: &mut String, report: &AuditReport) {
    let url = escape_html(&report.url);
    let _ = write!(
        out,
        r#"<section class="report"><div class="report-header">{}<div class="report-meta"><h2><a href="{url}" target="_blank" rel="noopener">{url}</a></h2><div class="meta"><span>{}</span><span>{}ms</span></div></div></div><div class="checks">"#,
        gauge(report.overall_score, &report.grade, 160),
        report.timestamp.to_rfc3339(),
        report.duration_ms,
        url = url,
    );
    for result in &report.results {
        write_check(out, result);
    }
    out.push_str("</div></section>");
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<header><h1>AX Audit Report</h1><p>AI agent readiness</p></header>
{body}
<footer>Generated by {agent}</footer>
</body>
</html>
"#,
        title = escape_html(title),
        style = STYLE,
        body = body,
        agent = env!("CARGO_PKG_NAME"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{sample_batch, sample_report};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_grade_colors() {
        assert_eq!(grade_hsl(&get_grade(95)), "hsl(140, 70%, 45%)");
        assert_eq!(grade_hsl(&get_grade(75)), "hsl(45, 90%, 48%)");
        assert_eq!(grade_hsl(&get_grade(55)), "hsl(25, 90%, 50%)");
        assert_eq!(grade_hsl(&get_grade(10)), "hsl(0, 80%, 50%)");
        assert_eq!(grade_hsl(&Grade::new(0, "Odd", "purple")), HSL_RED);
    }

    #[test]
    fn test_gauge_arc() {
        let full = gauge(100, &get_grade(100), 160);
        assert!(full.contains(r#"stroke-dashoffset="0.00""#));
        assert!(full.contains(r#"stroke-dasharray="339.29""#));

        let empty = gauge(0, &get_grade(0), 120);
        assert!(empty.contains(r#"stroke-dashoffset="339.29""#));
        assert!(empty.contains("width:120px"));
    }

    #[test]
    fn test_single_report_page() {
        let html = render_html(&sample_report());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>AX Audit: https://example.com</title>"));
        assert!(html.contains(r#"<span class="check-score" style="color:hsl(45, 90%, 48%)">72/100</span>"#));
        assert!(html.contains(r#"<div class="finding warn"><span class="icon warn">"#));
        assert!(html.contains(r#"<span class="finding-hint">Hint: Add a &gt; line</span>"#));
        assert!(html.contains(r#"<span class="finding-detail">0 links</span>"#));
    }

    #[test]
    fn test_untrusted_text_is_escaped() {
        let mut report = sample_report();
        report.url = "https://example.com/?q=\"><script>alert(1)</script>".to_string();
        report.results[0].name = "<b>name</b>".to_string();
        report.results[0].findings.push(
            Finding::fail("<script>alert('msg')</script>")
                .with_detail("<img src=x onerror=alert(1)>")
                .with_hint("use <meta> & friends"),
        );

        for html in [
            render_html(&report),
            render_batch_html(&sample_batch(report.clone()), 70),
        ] {
            assert!(!html.contains("<script>"));
            assert!(!html.contains("<img"));
            assert!(!html.contains("<b>name"));
            assert!(html.contains("&lt;script&gt;alert(&#39;msg&#39;)&lt;/script&gt;"));
            assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
            assert!(html.contains("use &lt;meta&gt; &amp; friends"));
            assert!(html.contains("?q=&quot;&gt;&lt;script&gt;"));
        }
    }

    #[test]
    fn test_batch_page_badges_follow_threshold() {
        let batch = sample_batch(sample_report());

        let lenient = render_batch_html(&batch, 70);
        assert!(lenient.contains("<h2>Batch Summary</h2>"));
        assert!(lenient.contains(r#"<span class="badge badge-pass">PASS</span>"#));
        assert!(lenient.contains("<title>AX Audit: Batch Report (1 URLs)</title>"));
        assert!(!lenient.contains("stat-label\">Failed"));

        let strict = render_batch_html(&batch, 80);
        assert!(strict.contains(r#"<span class="badge badge-fail">FAIL</span>"#));
    }
}
