//! CLI tool for auditing websites for AI agent readiness

use anyhow::{bail, Context};
use ax_audit::{audit, batch_audit, checks, report, AuditConfig, OutputFormat};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(name = "ax-audit")]
#[command(about = "Audit websites for AI agent readiness", long_about = None)]
#[command(version)]
struct Cli {
    /// URLs to audit (several URLs run a batch audit)
    #[arg(required = true)]
    urls: Vec<String>,

    /// Comma-separated check ids to run (default: all)
    #[arg(long, value_delimiter = ',')]
    checks: Option<Vec<String>>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Output format: terminal, json, markdown or html
    #[arg(short = 'f', long, default_value = "terminal")]
    format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(EXIT_FATAL);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = build_config(&cli)?;
    let format = if cli.json { OutputFormat::Json } else { cli.format };

    let spinner = (format == OutputFormat::Terminal).then(|| start_spinner(cli.urls.len()));

    let (content, score) = if let [url] = cli.urls.as_slice() {
        let result = audit(url, &config).await;
        if let Some(spinner) = &spinner {
            spinner.finish_and_clear();
        }
        let report = result.context("Audit failed")?;
        let content = match format {
            OutputFormat::Terminal => report::render_terminal(&report),
            OutputFormat::Json => report::render_json(&report)?,
            OutputFormat::Markdown => report::render_markdown(&report),
            OutputFormat::Html => report::render_html(&report),
        };
        (content, report.overall_score)
    } else {
        let result = batch_audit(&cli.urls, &config).await;
        if let Some(spinner) = &spinner {
            spinner.finish_and_clear();
        }
        let batch = result.context("Batch audit failed")?;
        let content = match format {
            OutputFormat::Terminal => report::render_batch_terminal(&batch),
            OutputFormat::Json => report::render_json(&batch)?,
            OutputFormat::Markdown => report::render_batch_markdown(&batch),
            OutputFormat::Html => {
                report::render_batch_html(&batch, config.scoring.pass_threshold)
            }
        };
        (content, batch.summary.average_score)
    };

    if let Some(output_path) = &cli.output {
        std::fs::write(output_path, &content)
            .with_context(|| format!("Failed to write report to {}", output_path.display()))?;
        println!("Report written to: {}", output_path.display());
    } else {
        println!("{}", content);
    }

    let passed = config.scoring.passes(score);
    debug!(
        "Score {} against threshold {}: {}",
        score,
        config.scoring.pass_threshold,
        if passed { "pass" } else { "fail" }
    );
    Ok(if passed { 0 } else { 1 })
}

/// Load the configuration file, then apply command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AuditConfig::default(),
    };

    if let Some(timeout) = cli.timeout {
        config.network.timeout_ms = timeout;
    }

    if let Some(requested) = &cli.checks {
        let requested: Vec<String> = requested
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
        let known = checks::ids();
        let unknown: Vec<&str> = requested
            .iter()
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "Unknown check(s): {}. Valid checks: {}",
                unknown.join(", "),
                known.join(", ")
            );
        }
        config.checks = Some(requested);
    }

    config.validate()?;
    Ok(config)
}

fn start_spinner(sites: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(if sites == 1 {
        "Auditing site...".to_string()
    } else {
        format!("Auditing {} sites...", sites)
    });
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ax_audit=debug"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
