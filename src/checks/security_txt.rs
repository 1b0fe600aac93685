//! RFC 9116 `/.well-known/security.txt`

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "security-txt",
    name: "Security.txt",
    description: "Checks /.well-known/security.txt RFC 9116 compliance",
    weight: 8,
};

pub const REQUIRED_FIELDS: &[&str] = &["Contact", "Expires"];
const OPTIONAL_FIELDS: &[&str] = &["Canonical", "Preferred-Languages", "Policy", "Encryption", "Hiring"];

pub struct SecurityTxt;

impl Check for SecurityTxt {
    fn meta(&self) -> CheckMeta {
        META
    }

    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
        check(ctx).boxed()
    }
}

fn has_field(text: &str, field: &str) -> Result<bool> {
    let pattern = format!(r"(?mi)^{}:", regex::escape(field));
    Ok(Regex::new(&pattern)?.is_match(text))
}

/// Parse an `Expires` value: RFC 3339, or a bare `YYYY-MM-DD` date
fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

async fn check(ctx: &CheckContext) -> Result<CheckResult> {
    let start = Instant::now();
    let mut findings = Vec::new();
    let mut score: i32 = 100;

    let res = ctx.fetch_path("/.well-known/security.txt").await;
    if !res.ok {
        findings.push(
            Finding::fail("/.well-known/security.txt not found")
                .with_detail(res.status_label())
                .with_hint("Create /.well-known/security.txt per RFC 9116 with at least Contact: and Expires: fields."),
        );
        return Ok(CheckResult::build(&META, 0, findings, start));
    }
    findings.push(Finding::pass("/.well-known/security.txt exists"));
    let text = res.body.as_str();

    for field in REQUIRED_FIELDS {
        if has_field(text, field)? {
            findings.push(Finding::pass(format!("Required field \"{}\" present", field)));
        } else {
            let example = if *field == "Contact" {
                "Use a mailto: or https: URI, e.g. Contact: mailto:security@example.com"
            } else {
                "Use an ISO 8601 date, e.g. Expires: 2027-12-31T23:59:59.000Z"
            };
            findings.push(
                Finding::fail(format!("Required field \"{}\" missing (RFC 9116)", field))
                    .with_hint(format!("Add \"{}:\" to security.txt. {}", field, example)),
            );
            score -= 25;
        }
    }

    let expires = Regex::new(r"(?mi)^Expires:\s*(.+)")?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_expires(m.as_str().trim()));
    if let Some(expires) = expires {
        if expires > Utc::now() {
            findings.push(Finding::pass(format!(
                "Expires date is in the future ({})",
                expires.format("%Y-%m-%d")
            )));
        } else {
            findings.push(
                Finding::fail("Expires date is in the past; security.txt is expired")
                    .with_hint("Update Expires to a future date; RFC 9116 requires a valid, non-expired file."),
            );
            score -= 20;
        }
    }

    let mut present = 0;
    for field in OPTIONAL_FIELDS {
        if has_field(text, field)? {
            present += 1;
        }
    }
    if present > 0 {
        findings.push(Finding::pass(format!(
            "{}/{} optional fields present",
            present,
            OPTIONAL_FIELDS.len()
        )));
    } else {
        findings.push(
            Finding::warn("No optional fields (Canonical, Preferred-Languages, Policy, etc.)")
                .with_hint("Consider Canonical:, Preferred-Languages: and Policy: entries."),
        );
        score -= 5;
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
