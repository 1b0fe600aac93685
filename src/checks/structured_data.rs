//! JSON-LD structured data embedded in the homepage

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "structured-data",
    name: "Structured Data",
    description: "Checks JSON-LD structured data on homepage",
    weight: 15,
};

const JSON_LD_PATTERN: &str =
    r#"(?is)<script\s+type=["']application/ld\+json["'][^>]*>(.*?)</script>"#;
const SCHEMA_ORG_CONTEXTS: &[&str] = &["https://schema.org", "https://schema.org/", "http://schema.org"];
const KEY_TYPES: &[&str] = &["Person", "Organization", "WebSite", "WebPage", "ProfilePage"];

pub struct StructuredData;

impl Check for StructuredData {
    fn meta(&self) -> CheckMeta {
        META
    }

    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
        check(ctx).boxed()
    }
}

async fn check(ctx: &CheckContext) -> Result<CheckResult> {
    let start = Instant::now();
    let mut findings = Vec::new();
    let mut score: i32 = 100;

    let html = ctx.html();
    if html.is_empty() {
        findings.push(Finding::fail("Could not fetch homepage HTML"));
        return Ok(CheckResult::build(&META, 0, findings, start));
    }

    let pattern = Regex::new(JSON_LD_PATTERN)?;
    let blocks: Vec<&str> = pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if blocks.is_empty() {
        findings.push(Finding::fail("No JSON-LD structured data found"));
        return Ok(CheckResult::build(&META, 0, findings, start));
    }
    findings.push(Finding::pass(format!("{} JSON-LD block(s) found", blocks.len())));

    let mut parsed: Vec<Value> = Vec::new();
    for block in &blocks {
        match serde_json::from_str::<Value>(&unescape_html(block)) {
            Ok(value) => parsed.push(value),
            Err(e) => {
                findings.push(Finding::warn("Invalid JSON in a JSON-LD block").with_detail(e.to_string()));
                score -= 10;
            }
        }
    }

    if parsed.is_empty() {
        findings.push(Finding::fail("All JSON-LD blocks have invalid JSON"));
        return Ok(CheckResult::build(&META, 10, findings, start));
    }

    let has_context = parsed.iter().any(|d| {
        d.get("@context")
            .and_then(Value::as_str)
            .map_or(false, |c| SCHEMA_ORG_CONTEXTS.contains(&c))
    });
    if has_context {
        findings.push(Finding::pass("@context references schema.org"));
    } else {
        findings.push(Finding::warn("No @context referencing schema.org"));
        score -= 15;
    }

    if parsed.iter().any(|d| d.get("@graph").map_or(false, Value::is_array)) {
        findings.push(Finding::pass("@graph array present (multi-entity structured data)"));
    } else {
        findings.push(Finding::warn("No @graph array (single-entity only)"));
        score -= 5;
    }

    let mut types = BTreeSet::new();
    for value in &parsed {
        collect_types(value, &mut types);
    }

    let found: Vec<&str> = KEY_TYPES
        .iter()
        .copied()
        .filter(|t| types.contains(*t))
        .collect();
    match found.len() {
        0 => {
            findings.push(Finding::warn(
                "No key entity types (Person, Organization, WebSite, etc.)",
            ));
            score -= 15;
        }
        1 => {
            let missing: Vec<&str> = KEY_TYPES
                .iter()
                .copied()
                .filter(|t| !types.contains(*t))
                .collect();
            findings.push(
                Finding::warn(format!("Only 1 key type found: {}", found[0]))
                    .with_detail(format!("Consider adding: {}", missing.join(", "))),
            );
            score -= 10;
        }
        _ => findings.push(Finding::pass(format!("Key types found: {}", found.join(", ")))),
    }

    if types.contains("BreadcrumbList") {
        findings.push(Finding::pass("BreadcrumbList present"));
    } else {
        findings.push(Finding::warn("No BreadcrumbList found"));
        score -= 5;
    }

    Ok(CheckResult::build(&META, score, findings, start))
}

fn unescape_html(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}

/// Gather `@type` values from a JSON-LD document, descending into `@graph` and arrays
fn collect_types(value: &Value, types: &mut BTreeSet<String>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_types(item, types)),
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(t)) => {
                    types.insert(t.clone());
                }
                Some(Value::Array(ts)) => {
                    types.extend(ts.iter().filter_map(Value::as_str).map(String::from));
                }
                _ => {}
            }
            if let Some(Value::Array(graph)) = map.get("@graph") {
                graph.iter().for_each(|item| collect_types(item, types));
            }
        }
        _ => {}
    }
}
