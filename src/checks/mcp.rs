//! Model Context Protocol descriptor at `/.well-known/mcp.json`

use super::{display_value, is_truthy};
use crate::check::{Check, CheckContext};
use crate::error::Result;
use crate::types::{CheckMeta, CheckResult, Finding};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::time::Instant;

pub const META: CheckMeta = CheckMeta {
    id: "mcp",
    name: "MCP (Model Context Protocol)",
    description: "Checks /.well-known/mcp.json presence and configuration",
    weight: 10,
};

pub struct Mcp;

impl Check for Mcp {
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

    let res = ctx.fetch_path("/.well-known/mcp.json").await;
    if !res.ok {
        findings.push(
            Finding::fail("/.well-known/mcp.json not found")
                .with_detail(res.status_label())
                .with_hint("Describe your MCP server in /.well-known/mcp.json with name, description, tools and version fields."),
        );
        return Ok(CheckResult::build(&META, 0, findings, start));
    }
    findings.push(Finding::pass("/.well-known/mcp.json exists"));

    let data: Value = match serde_json::from_str(&res.body) {
        Ok(data) => data,
        Err(e) => {
            findings.push(
                Finding::fail("Invalid JSON")
                    .with_detail(e.to_string())
                    .with_hint("Fix the JSON syntax in mcp.json and validate it with a JSON linter."),
            );
            return Ok(CheckResult::build(&META, 10, findings, start));
        }
    };
    findings.push(Finding::pass("Valid JSON"));

    match data.get("name").filter(|v| is_truthy(Some(*v))) {
        Some(name) => findings.push(Finding::pass(format!(
            "Server name: \"{}\"",
            display_value(name)
        ))),
        None => {
            findings.push(
                Finding::warn("Missing server name")
                    .with_hint("Add a \"name\" field identifying your MCP server."),
            );
            score -= 10;
        }
    }

    if is_truthy(data.get("description")) {
        findings.push(Finding::pass("Server description present"));
    } else {
        findings.push(
            Finding::warn("Missing server description")
                .with_hint("Add a \"description\" explaining what the server and its tools do."),
        );
        score -= 5;
    }

    match data.get("tools").and_then(Value::as_array) {
        Some(tools) if !tools.is_empty() => {
            findings.push(Finding::pass(format!("{} tool(s) defined", tools.len())));
            let described = tools
                .iter()
                .filter(|t| is_truthy(t.get("description")))
                .count();
            if described == tools.len() {
                findings.push(Finding::pass("All tools have descriptions"));
            } else if described > 0 {
                findings.push(
                    Finding::warn(format!(
                        "{}/{} tools have descriptions",
                        described,
                        tools.len()
                    ))
                    .with_hint("Give every tool a \"description\" so agents know when to use it."),
                );
                score -= 5;
            } else {
                findings.push(
                    Finding::warn("No tools have descriptions")
                        .with_hint("Add a \"description\" to each tool in the tools array."),
                );
                score -= 10;
            }
        }
        Some(_) => {
            findings.push(
                Finding::warn("Tools array is empty")
                    .with_hint("Add at least one tool with name, description and inputSchema."),
            );
            score -= 15;
        }
        None => {
            findings.push(
                Finding::warn("No tools array defined")
                    .with_hint("Add a \"tools\" array; each tool needs name, description and inputSchema."),
            );
            score -= 15;
        }
    }

    match data.get("resources").and_then(Value::as_array) {
        Some(resources) if !resources.is_empty() => {
            findings.push(Finding::pass(format!("{} resource(s) defined", resources.len())));
        }
        _ => {
            findings.push(
                Finding::warn("No resources defined")
                    .with_hint("List the data resources your server exposes in a \"resources\" array."),
            );
            score -= 5;
        }
    }

    if let Some(prompts) = data.get("prompts").and_then(Value::as_array) {
        if !prompts.is_empty() {
            findings.push(Finding::pass(format!("{} prompt(s) defined", prompts.len())));
        }
    }

    let version = data
        .get("protocolVersion")
        .filter(|v| is_truthy(Some(*v)))
        .or_else(|| data.get("version").filter(|v| is_truthy(Some(*v))));
    match version {
        Some(version) => findings.push(Finding::pass(format!(
            "Protocol version: {}",
            display_value(version)
        ))),
        None => {
            findings.push(
                Finding::warn("No protocol version specified")
                    .with_hint("Add a \"protocolVersion\" field, e.g. \"2024-11-05\"."),
            );
            score -= 5;
        }
    }

    if is_truthy(data.get("authentication")) {
        findings.push(Finding::pass("Authentication configuration present"));
    }

    if res.header("access-control-allow-origin").is_some() {
        findings.push(Finding::pass("CORS enabled on MCP endpoint"));
    } else {
        findings.push(
            Finding::warn("No CORS headers on MCP endpoint")
                .with_hint("Serve mcp.json with Access-Control-Allow-Origin: * so browser-based agents can read it."),
        );
        score -= 10;
    }

    Ok(CheckResult::build(&META, score, findings, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_support::context;

    async fn run_with(body: &str, cors: bool) -> CheckResult {
        let mut server = mockito::Server::new_async().await;
        let mut mock = server
            .mock("GET", "/.well-known/mcp.json")
            .with_body(body);
        if cors {
            mock = mock.with_header("Access-Control-Allow-Origin", "*");
        }
        mock.create_async().await;
        let ctx = context(&server.url(), "", &[]);
        Mcp.run(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_complete_descriptor() {
        let result = run_with(
            r#"{
                "name": "example-mcp",
                "description": "Tools for example.com",
                "tools": [{"name": "search", "description": "Search the site"}],
                "resources": [{"uri": "docs://index"}],
                "prompts": [{"name": "summarize"}],
                "protocolVersion": "2024-11-05",
                "authentication": {"type": "none"}
            }"#,
            true,
        )
        .await;

        assert_eq!(result.score, 100);
        assert!(result.findings.iter().any(|f| f.message == "1 prompt(s) defined"));
        assert!(result
            .findings
            .iter()
            .any(|f| f.message == "Protocol version: 2024-11-05"));
    }

    #[tokio::test]
    async fn test_sparse_descriptor_without_cors() {
        let result = run_with(
            r#"{"name": "x", "tools": [{"name": "a"}, {"name": "b", "description": "b"}]}"#,
            false,
        )
        .await;

        // description 5, tool descriptions 5, resources 5, version 5, cors 10
        assert_eq!(result.score, 70);
        assert!(result
            .findings
            .iter()
            .any(|f| f.message == "1/2 tools have descriptions"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let result = run_with("[1, 2", true).await;
        assert_eq!(result.score, 10);
    }

    #[tokio::test]
    async fn test_version_field_fallback() {
        let result = run_with(r#"{"version": "1.0", "tools": []}"#, true).await;

        // name 10, description 5, empty tools 15, resources 5
        assert_eq!(result.score, 65);
        assert!(result.findings.iter().any(|f| f.message == "Protocol version: 1.0"));
    }
}
