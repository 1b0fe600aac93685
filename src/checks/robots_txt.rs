//! AI crawler rules in `/robots.txt`

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding, FindingStatus};
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "robots-txt",
    name: "Robots.txt",
    description: "Checks AI crawler configuration in robots.txt",
    weight: 15,
};

/// Crawlers that collect training data
pub const TRAINING_CRAWLERS: &[&str] = &[
    "GPTBot",
    "ClaudeBot",
    "Claude-Web",
    "Anthropic-AI",
    "Google-Extended",
    "CCBot",
    "Bytespider",
    "Meta-ExternalAgent",
    "Meta-ExternalFetcher",
    "Cohere-AI",
    "cohere-training-data-crawler",
    "Applebot-Extended",
    "Amazonbot",
    "AI2Bot",
    "AI2Bot-Dolma",
    "DeepSeek-AI",
    "PanguBot",
    "Diffbot",
];

/// Crawlers that fetch pages for AI search and chat answers
pub const SEARCH_CRAWLERS: &[&str] = &[
    "OAI-SearchBot",
    "ChatGPT-User",
    "Claude-SearchBot",
    "Claude-User",
    "PerplexityBot",
    "Perplexity-User",
    "DuckAssistBot",
    "YouBot",
    "Petalbot",
    "Google-CloudVertexBot",
    "Gemini",
];

/// Agent-style fetchers
pub const FETCHING_CRAWLERS: &[&str] = &["FirecrawlAgent", "Facebookbot"];

/// Crawlers every AI-ready robots.txt should address explicitly
pub const CORE_CRAWLERS: &[&str] = &[
    "GPTBot",
    "ClaudeBot",
    "ChatGPT-User",
    "Claude-SearchBot",
    "Google-Extended",
    "PerplexityBot",
];

const WELL_COVERED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
struct AgentGroup {
    name: String,
    disallowed: bool,
}

pub struct RobotsTxt;

impl Check for RobotsTxt {
    fn meta(&self) -> CheckMeta {
        META
    }

    fn run<'a>(&'a self, ctx: &'a CheckContext) -> BoxFuture<'a, Result<CheckResult>> {
        check(ctx).boxed()
    }
}

fn all_crawlers() -> impl Iterator<Item = &'static str> {
    TRAINING_CRAWLERS
        .iter()
        .chain(SEARCH_CRAWLERS)
        .chain(FETCHING_CRAWLERS)
        .copied()
}

fn is_configured(groups: &[AgentGroup], bot: &str) -> bool {
    groups.iter().any(|g| g.name.eq_ignore_ascii_case(bot))
}

async fn check(ctx: &CheckContext) -> Result<CheckResult> {
    let start = Instant::now();
    let mut findings = Vec::new();
    let mut score: i32 = 100;

    let res = ctx.fetch_path("/robots.txt").await;
    if !res.ok {
        findings.push(Finding::fail("/robots.txt not found").with_detail(res.status_label()));
        return Ok(CheckResult::build(&META, 0, findings, start));
    }

    findings.push(Finding::pass("/robots.txt exists"));
    let text = res.body.as_str();
    let groups = parse_user_agents(text)?;

    let (core_configured, core_missing): (Vec<&str>, Vec<&str>) = CORE_CRAWLERS
        .iter()
        .copied()
        .partition(|bot| is_configured(&groups, bot));

    if core_missing.is_empty() {
        findings.push(Finding::pass(format!(
            "All {} core AI crawlers explicitly configured",
            CORE_CRAWLERS.len()
        )));
    } else if !core_configured.is_empty() {
        findings.push(
            Finding::warn(format!(
                "{}/{} core AI crawlers configured",
                core_configured.len(),
                CORE_CRAWLERS.len()
            ))
            .with_detail(format!("Missing: {}", core_missing.join(", "))),
        );
        let ratio = core_missing.len() as f64 / CORE_CRAWLERS.len() as f64;
        score -= (ratio * 30.0).round() as i32;
    } else {
        findings.push(
            Finding::fail("No core AI crawlers explicitly configured")
                .with_detail(format!("Expected: {}", CORE_CRAWLERS.join(", "))),
        );
        score -= 40;
    }

    let blocked: Vec<&str> = groups
        .iter()
        .filter(|g| g.disallowed && all_crawlers().any(|bot| bot.eq_ignore_ascii_case(&g.name)))
        .map(|g| g.name.as_str())
        .collect();
    if !blocked.is_empty() {
        findings.push(
            Finding::warn(format!("{} AI crawler(s) explicitly blocked", blocked.len()))
                .with_detail(blocked.join(", ")),
        );
        score -= blocked.len() as i32 * 3;
    }

    if Regex::new(r"(?mi)^Sitemap:")?.is_match(text) {
        findings.push(Finding::pass("Sitemap directive present"));
    } else {
        findings.push(Finding::warn("No Sitemap directive found"));
        score -= 5;
    }

    let total_known = all_crawlers().count();
    let configured = all_crawlers().filter(|bot| is_configured(&groups, bot)).count();
    let status = if configured >= WELL_COVERED {
        FindingStatus::Pass
    } else {
        FindingStatus::Warn
    };
    findings.push(Finding::new(
        status,
        format!(
            "{}/{} known AI crawlers have explicit rules",
            configured, total_known
        ),
    ));

    Ok(CheckResult::build(&META, score, findings, start))
}

/// One entry per `User-agent` line; `Disallow: /` marks the latest entry blocked
fn parse_user_agents(text: &str) -> Result<Vec<AgentGroup>> {
    let user_agent = Regex::new(r"(?i)^User-agent:\s*(.+)")?;
    let disallow_all = Regex::new(r"(?i)^Disallow:\s*/\s*$")?;

    let mut groups: Vec<AgentGroup> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(caps) = user_agent.captures(trimmed) {
            groups.push(AgentGroup {
                name: caps[1].trim().to_string(),
                disallowed: false,
            });
        } else if disallow_all.is_match(trimmed) {
            if let Some(current) = groups.last_mut() {
                current.disallowed = true;
            }
        }
    }
    Ok(groups)
}
