//! Security headers, AI discovery `Link` headers and CORS

use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "http-headers",
    name: "HTTP Headers",
    description: "Checks security headers, AI discovery Link headers, and CORS",
    weight: 15,
};

/// A response header the check looks for
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeader {
    /// Lower-case header name
    pub name: &'static str,
    pub label: &'static str,
    pub critical: bool,
}

pub const SECURITY_HEADERS: &[SecurityHeader] = &[
    SecurityHeader { name: "strict-transport-security", label: "Strict-Transport-Security", critical: true },
    SecurityHeader { name: "x-content-type-options", label: "X-Content-Type-Options", critical: true },
    SecurityHeader { name: "x-frame-options", label: "X-Frame-Options", critical: false },
    SecurityHeader { name: "x-xss-protection", label: "X-XSS-Protection", critical: false },
    SecurityHeader { name: "referrer-policy", label: "Referrer-Policy", critical: false },
    SecurityHeader { name: "permissions-policy", label: "Permissions-Policy", critical: false },
    SecurityHeader { name: "content-security-policy", label: "Content-Security-Policy", critical: false },
];

const MIN_SECURITY_HEADERS: usize = 4;

pub struct HttpHeaders;

impl Check for HttpHeaders {
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

    if ctx.headers().is_empty() {
        findings.push(Finding::fail("Could not fetch homepage headers"));
        return Ok(CheckResult::build(&META, 0, findings, start));
    }

    let mut present = 0;
    for header in SECURITY_HEADERS {
        if ctx.header(header.name).map_or(false, |v| !v.is_empty()) {
            present += 1;
        } else if header.critical {
            findings.push(Finding::fail(format!("Missing critical header: {}", header.label)));
            score -= 10;
        }
    }

    if present == SECURITY_HEADERS.len() {
        findings.push(Finding::pass(format!(
            "All {} security headers present",
            SECURITY_HEADERS.len()
        )));
    } else if present >= MIN_SECURITY_HEADERS {
        findings.push(Finding::pass(format!(
            "{}/{} security headers present",
            present,
            SECURITY_HEADERS.len()
        )));
    } else {
        findings.push(Finding::warn(format!(
            "Only {}/{} security headers present",
            present,
            SECURITY_HEADERS.len()
        )));
        score -= 5;
    }

    let link = ctx.header("link").unwrap_or_default().to_ascii_lowercase();
    let links_llms = link.contains("llms.txt");
    let links_agent = link.contains("agent.json");
    match (links_llms, links_agent) {
        (true, true) => {
            findings.push(Finding::pass("Link header references both llms.txt and agent.json"));
        }
        (true, false) => {
            findings.push(Finding::pass("Link header references llms.txt"));
            findings.push(Finding::warn("Link header does not reference agent.json"));
            score -= 5;
        }
        (false, true) => {
            findings.push(Finding::pass("Link header references agent.json"));
            findings.push(Finding::warn("Link header does not reference llms.txt"));
            score -= 5;
        }
        (false, false) if !link.is_empty() => {
            findings.push(Finding::warn(
                "Link header present but does not reference AI discovery files",
            ));
            score -= 15;
        }
        (false, false) => {
            findings.push(Finding::warn(
                "No Link header for AI discovery (llms.txt, agent.json)",
            ));
            score -= 15;
        }
    }

    let agent = ctx.fetch_path("/.well-known/agent.json").await;
    if agent.ok {
        if agent.header("access-control-allow-origin").is_some() {
            findings.push(Finding::pass("CORS enabled on .well-known resources"));
        } else {
            findings.push(Finding::warn("No CORS headers on .well-known resources"));
            score -= 10;
        }
    }

    let llms = ctx.fetch_path("/llms.txt").await;
    let noindex = llms
        .header("x-robots-tag")
        .map_or(false, |v| v.contains("noindex"));
    if llms.ok && noindex {
        findings.push(Finding::pass(
            "X-Robots-Tag: noindex on /llms.txt (prevents search indexing of raw text)",
        ));
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
