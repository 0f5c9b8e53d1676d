//! Generate the monthly status report.
//!
//! Usage: `generate_report [SECTION ...]`
//!
//! Without arguments every section is generated. Paths, period and output
//! format come from `REPORT_DATA_DIR`, `REPORT_TEMPLATE_DIR`,
//! `REPORT_OUTPUT_DIR`, `REPORT_PERIOD` (`YYYY-MM`, default: previous month)
//! and `REPORT_FORMAT` (`json` or `markdown`).

use anyhow::{bail, Context, Result};
use status_report_rust::{FileDataSource, InjectionOutcome, ReportConfig, ReportRun, SectionOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "status_report_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let keys: Vec<String> = std::env::args().skip(1).collect();
    let config = ReportConfig::from_env().context("Invalid report configuration")?;

    tracing::info!(
        "Report period {} ({}), data: {}, templates: {}, output: {}",
        config.period(),
        config.period().label(),
        config.data_dir().display(),
        config.template_dir().display(),
        config.output_dir().display()
    );

    let source = FileDataSource::new(config.data_dir());
    let run = ReportRun::new(config, Box::new(source));
    let outcomes = run.run_keys(&keys)?;

    println!("\n{}", "=".repeat(70));
    println!("REPORT {}", run.config().period().label().to_uppercase());
    println!("{}", "=".repeat(70));

    let mut failed = 0;
    for outcome in &outcomes {
        match outcome {
            SectionOutcome::Generated(report) => {
                let data = if report.substituted { "substitute" } else { "loaded" };
                println!(
                    "✓ {:<16} {} table(s), {} data, {} ms -> {}",
                    report.section_key,
                    report.injected_tables(),
                    data,
                    report.elapsed_ms,
                    report.path.display()
                );
                for table in &report.outcomes {
                    match table {
                        InjectionOutcome::Injected { .. } => {}
                        InjectionOutcome::MarkerNotFound { marker } => {
                            println!("    marker {} not found, table left as authored", marker)
                        }
                        InjectionOutcome::Failed { marker, reason } => {
                            println!("    table {} failed: {}", marker, reason)
                        }
                    }
                }
            }
            SectionOutcome::Failed { section_key, error } => {
                failed += 1;
                println!("✗ {:<16} {}", section_key, error);
            }
        }
    }
    println!("{}", "=".repeat(70));

    if failed > 0 {
        bail!("{} of {} section(s) failed", failed, outcomes.len());
    }
    Ok(())
}
