//! A2A agent card at `/.well-known/agent.json`

use super::{display_value, is_present, is_truthy};
use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "agent-json",
    name: "Agent Card (A2A)",
    description: "Checks /.well-known/agent.json A2A protocol compliance",
    weight: 10,
};

pub const REQUIRED_FIELDS: &[&str] = &["name", "description", "url", "skills"];
const OPTIONAL_FIELDS: &[&str] = &["capabilities", "authentication", "documentationUrl"];

pub struct AgentJson;

impl Check for AgentJson {
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

    let res = ctx.fetch_path("/.well-known/agent.json").await;
    if !res.ok {
        findings.push(
            Finding::fail("/.well-known/agent.json not found")
                .with_detail(res.status_label())
                .with_hint("Publish an A2A agent card at /.well-known/agent.json with name, description, url and skills fields."),
        );
        return Ok(CheckResult::build(&META, 0, findings, start));
    }
    findings.push(Finding::pass("/.well-known/agent.json exists"));

    let data: Value = match serde_json::from_str(&res.body) {
        Ok(data) => data,
        Err(e) => {
            findings.push(
                Finding::fail("Invalid JSON")
                    .with_detail(e.to_string())
                    .with_hint("Fix the JSON syntax in agent.json and validate it with a JSON linter."),
            );
            return Ok(CheckResult::build(&META, 10, findings, start));
        }
    };
    findings.push(Finding::pass("Valid JSON"));

    for field in REQUIRED_FIELDS {
        if is_present(data.get(field)) {
            findings.push(Finding::pass(format!("Required field \"{}\" present", field)));
        } else {
            findings.push(
                Finding::fail(format!("Required field \"{}\" missing", field)).with_hint(
                    format!("Add the \"{}\" field; the A2A protocol requires it.", field),
                ),
            );
            score -= 15;
        }
    }

    if let Some(skills) = data.get("skills").and_then(Value::as_array) {
        if skills.is_empty() {
            findings.push(
                Finding::warn("Skills array is empty")
                    .with_hint("Describe at least one skill your site or agent offers."),
            );
            score -= 10;
        } else {
            findings.push(Finding::pass(format!("{} skill(s) defined", skills.len())));
        }
    }

    match data.get("protocolVersion").filter(|v| is_truthy(Some(*v))) {
        Some(version) => findings.push(Finding::pass(format!(
            "Protocol version: {}",
            display_value(version)
        ))),
        None => {
            findings.push(
                Finding::warn("No protocolVersion field")
                    .with_hint("Declare A2A compatibility, e.g. \"protocolVersion\": \"0.2.0\"."),
            );
            score -= 5;
        }
    }

    let present = OPTIONAL_FIELDS
        .iter()
        .filter(|f| data.get(**f).is_some())
        .count();
    if present == OPTIONAL_FIELDS.len() {
        findings.push(Finding::pass(
            "All optional fields present (capabilities, authentication, documentationUrl)",
        ));
    } else if present > 0 {
        findings.push(Finding::pass(format!(
            "{}/{} optional fields present",
            present,
            OPTIONAL_FIELDS.len()
        )));
    } else {
        findings.push(
            Finding::warn("No optional fields (capabilities, authentication, documentationUrl)")
                .with_hint("Consider adding capabilities, authentication and documentationUrl."),
        );
        score -= 5;
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
