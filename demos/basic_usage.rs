//! Basic example of using the audit API

use ax_audit::{audit, AuditConfig, FindingStatus};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    // Use default configuration
    let config = AuditConfig::default();

    println!("Auditing site at: {}", url);
    let report = audit(&url, &config).await?;

    println!("\n=== Audit Results ===");
    println!("URL: {}", report.url);
    println!("Score: {}/100 ({})", report.overall_score, report.grade);
    println!();

    for result in &report.results {
        println!("{:<28} {:>3}", result.name, result.score);
    }

    // Show failing findings
    let failures: Vec<_> = report
        .results
        .iter()
        .flat_map(|r| r.findings.iter().map(move |f| (r, f)))
        .filter(|(_, f)| f.status == FindingStatus::Fail)
        .collect();

    if !failures.is_empty() {
        println!("\nFailures:");
        for (result, finding) in failures {
            println!("  - [{}] {}", result.id, finding.message);
            if let Some(hint) = &finding.hint {
                println!("    {}", hint);
            }
        }
    } else {
        println!("\n✓ No failing findings!");
    }

    Ok(())
}
