//! OpenAPI document at `/.well-known/openapi.json`

use super::{display_value, is_truthy};
use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "openapi",
    name: "OpenAPI Spec",
    description: "Checks /.well-known/openapi.json presence and validity",
    weight: 8,
};

pub struct OpenApi;

impl Check for OpenApi {
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

    let res = ctx.fetch_path("/.well-known/openapi.json").await;
    if !res.ok {
        findings.push(
            Finding::fail("/.well-known/openapi.json not found").with_detail(res.status_label()),
        );
        return Ok(CheckResult::build(&META, 0, findings, start));
    }
    findings.push(Finding::pass("/.well-known/openapi.json exists"));

    let data: Value = match serde_json::from_str(&res.body) {
        Ok(data) => data,
        Err(e) => {
            findings.push(Finding::fail("Invalid JSON").with_detail(e.to_string()));
            return Ok(CheckResult::build(&META, 10, findings, start));
        }
    };
    findings.push(Finding::pass("Valid JSON"));

    let openapi = data.get("openapi").filter(|v| is_truthy(Some(*v)));
    let swagger = data.get("swagger").filter(|v| is_truthy(Some(*v)));
    match (openapi, swagger) {
        (Some(version), _) => findings.push(Finding::pass(format!(
            "OpenAPI version: {}",
            display_value(version)
        ))),
        (None, Some(version)) => {
            findings.push(Finding::warn(format!(
                "Swagger version: {} (consider upgrading to OpenAPI 3.x)",
                display_value(version)
            )));
            score -= 10;
        }
        (None, None) => {
            findings.push(Finding::fail("No openapi or swagger version field"));
            score -= 20;
        }
    }

    let info = data.get("info");
    match info.and_then(|i| i.get("title")).filter(|v| is_truthy(Some(*v))) {
        Some(title) => findings.push(Finding::pass(format!(
            "API title: \"{}\"",
            display_value(title)
        ))),
        None => {
            findings.push(Finding::warn("Missing info.title"));
            score -= 10;
        }
    }

    if is_truthy(info.and_then(|i| i.get("description"))) {
        findings.push(Finding::pass("API description present"));
    } else {
        findings.push(Finding::warn("Missing info.description"));
        score -= 5;
    }

    match data.get("paths").and_then(Value::as_object) {
        Some(paths) if !paths.is_empty() => {
            findings.push(Finding::pass(format!("{} path(s) documented", paths.len())));
        }
        _ => {
            findings.push(Finding::warn("No paths documented"));
            score -= 15;
        }
    }

    match data.get("servers").and_then(Value::as_array) {
        Some(servers) if !servers.is_empty() => {
            findings.push(Finding::pass(format!("{} server(s) defined", servers.len())));
        }
        _ => {
            findings.push(Finding::warn("No servers defined"));
            score -= 5;
        }
    }

    Ok(CheckResult::build(&META, score, findings, start))
}
