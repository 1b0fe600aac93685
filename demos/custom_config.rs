//! Example showing custom configuration and batch audits

use ax_audit::{batch_audit, AuditConfig, Grade, GradeScale, ScoringConfig};
use std::collections::HashMap;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: custom_config <URL>...");
        std::process::exit(2);
    }

    // Stricter bands and a heavier weight on crawler policy
    let grades = GradeScale::new(vec![
        Grade::new(95, "Agent-ready", "green"),
        Grade::new(75, "Almost there", "yellow"),
        Grade::new(0, "Needs work", "red"),
    ])?;

    let config = AuditConfig::builder()
        .timeout_ms(5_000)
        .checks(["llms-txt", "robots-txt", "agent-json", "http-headers"])
        .scoring(ScoringConfig {
            pass_threshold: 75,
            grades,
            weight_overrides: HashMap::from([("robots-txt".to_string(), 30)]),
        })
        .build();

    println!("Auditing {} site(s) with custom configuration...\n", urls.len());

    let batch = batch_audit(&urls, &config).await?;

    println!("=== Custom Batch Results ===");
    for report in &batch.reports {
        println!("{:>3} {:<13} {}", report.overall_score, report.grade.label, report.url);
    }
    println!(
        "\nPassed {}/{}; average {} ({})",
        batch.summary.passed, batch.summary.total, batch.summary.average_score, batch.summary.grade
    );

    Ok(())
}
