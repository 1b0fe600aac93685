//! AI meta tags and discovery links in the homepage markup

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "meta-tags",
    name: "Meta Tags",
    description: "Checks AI meta tags, rel=\"alternate\", and rel=\"me\" links",
    weight: 8,
};

pub const AI_META_NAMES: &[&str] = &["ai:summary", "ai:content_type", "ai:author", "ai:api", "ai:agent_card"];

pub struct MetaTags;

impl Check for MetaTags {
    fn meta(&self) -> CheckMeta {
        META
    }

    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
        check(ctx).boxed()
    }
}

/// `rel="alternate"` link mentioning `target`, in either attribute order
fn has_alternate_link(html: &str, target: &str) -> Result<bool> {
    let target = regex::escape(target);
    let before = Regex::new(&format!(r#"(?i)rel=["']alternate["'][^>]*{}"#, target))?;
    let after = Regex::new(&format!(r#"(?i){}[^>]*rel=["']alternate["']"#, target))?;
    Ok(before.is_match(html) || after.is_match(html))
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

    let mut found = Vec::new();
    for name in AI_META_NAMES {
        let pattern = format!(r#"(?i)<meta\s+[^>]*name=["']{}["'][^>]*>"#, regex::escape(name));
        if Regex::new(&pattern)?.is_match(html) {
            found.push(*name);
        }
    }

    let summary = format!("{}/{} AI meta tags found", found.len(), AI_META_NAMES.len());
    if found.len() >= 3 {
        findings.push(Finding::pass(summary).with_detail(found.join(", ")));
    } else if !found.is_empty() {
        findings.push(
            Finding::warn(summary)
                .with_detail(found.join(", "))
                .with_hint("Add more AI meta tags, e.g. <meta name=\"ai:summary\" content=\"...\">, <meta name=\"ai:author\" content=\"...\">."),
        );
        score -= 15;
    } else {
        findings.push(
            Finding::warn("No AI meta tags (ai:*) found")
                .with_hint("Add AI meta tags to <head>: <meta name=\"ai:summary\" content=\"Brief description\">."),
        );
        score -= 25;
    }

    if has_alternate_link(html, "llms.txt")? {
        findings.push(Finding::pass("rel=\"alternate\" link to llms.txt present"));
    } else {
        findings.push(
            Finding::warn("No rel=\"alternate\" link to llms.txt in HTML")
                .with_hint("Add <link rel=\"alternate\" type=\"text/plain\" href=\"/llms.txt\"> to <head>."),
        );
        score -= 15;
    }

    if has_alternate_link(html, "agent.json")? {
        findings.push(Finding::pass("rel=\"alternate\" link to agent.json present"));
    } else {
        findings.push(
            Finding::warn("No rel=\"alternate\" link to agent.json in HTML")
                .with_hint("Add <link rel=\"alternate\" type=\"application/json\" href=\"/.well-known/agent.json\"> to <head>."),
        );
        score -= 10;
    }

    let rel_me = Regex::new(r#"(?i)rel=["']me["']"#)?.find_iter(html).count();
    if rel_me > 0 {
        findings.push(Finding::pass(format!("{} rel=\"me\" identity link(s) found", rel_me)));
    } else {
        findings.push(
            Finding::warn("No rel=\"me\" identity links found")
                .with_hint("Link your profiles with rel=\"me\", e.g. <link rel=\"me\" href=\"https://github.com/you\">."),
        );
        score -= 10;
    }

    if Regex::new(r#"(?i)<meta\s+[^>]*property=["']og:"#)?.is_match(html) {
        findings.push(Finding::pass("OpenGraph meta tags present"));
    } else {
        findings.push(
            Finding::warn("No OpenGraph meta tags found")
                .with_hint("Add og:title, og:description and og:url meta tags."),
        );
        score -= 10;
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
