//! `/llms.txt` presence and structure

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "llms-txt",
    name: "LLMs.txt",
    description: "Checks /llms.txt presence and format compliance",
    weight: 15,
};

const LINK_PATTERN: &str = r"\[([^\]]+)\]\((https?://[^)]+)\)";
const MIN_CONTENT_CHARS: usize = 100;

pub struct LlmsTxt;

impl Check for LlmsTxt {
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

    let res = ctx.fetch_path("/llms.txt").await;
    if !res.ok {
        findings.push(
            Finding::fail("/llms.txt not found")
                .with_detail(res.status_label())
                .with_hint("Create a /llms.txt file at your site root following the llmstxt.org format: a Markdown file starting with \"# Your Site Name\", a description, sections, and links."),
        );
        return Ok(CheckResult::build(&META, 0, findings, start));
    }

    findings.push(Finding::pass("/llms.txt exists"));
    let text = res.body.as_str();
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    match lines.first().and_then(|l| l.strip_prefix("# ")) {
        Some(title) => findings.push(Finding::pass(format!("H1 heading: \"{}\"", title))),
        None => {
            findings.push(
                Finding::warn("Missing H1 heading (first line should start with \"# \")")
                    .with_hint("Add an H1 heading as the first line, e.g.: # Your Site Name"),
            );
            score -= 15;
        }
    }

    if lines.iter().any(|l| l.starts_with("> ")) {
        findings.push(Finding::pass("Blockquote description present"));
    } else {
        findings.push(
            Finding::warn("No blockquote description found (\"> ...\")")
                .with_hint("Add a blockquote summary after the H1 heading, e.g.: > A brief summary of your site for AI agents."),
        );
        score -= 10;
    }

    let sections = lines.iter().filter(|l| l.starts_with("## ")).count();
    if sections == 0 {
        findings.push(
            Finding::warn("No section headings found (## ...)")
                .with_hint("Organize content under ## headings such as ## About, ## API, ## Documentation."),
        );
        score -= 10;
    } else {
        findings.push(Finding::pass(format!("{} section heading(s) found", sections)));
    }

    let links = Regex::new(LINK_PATTERN)?.find_iter(text).count();
    if links == 0 {
        findings.push(
            Finding::warn("No Markdown links found")
                .with_hint("Link relevant pages: [Page Title](https://example.com/page)."),
        );
        score -= 10;
    } else {
        findings.push(Finding::pass(format!("{} link(s) found", links)));
    }

    if text.chars().count() < MIN_CONTENT_CHARS {
        findings.push(
            Finding::warn("Content appears minimal (< 100 characters)")
                .with_hint("Describe your site, its purpose and available resources in more detail."),
        );
        score -= 10;
    }

    let full = ctx.fetch_path("/llms-full.txt").await;
    if full.ok {
        findings.push(Finding::pass("/llms-full.txt also available (bonus)"));
        score = (score + 10).min(100);
    } else {
        findings.push(
            Finding::warn("/llms-full.txt not found (optional but recommended)")
                .with_hint("Publish /llms-full.txt with the expanded documentation for AI agents."),
        );
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
