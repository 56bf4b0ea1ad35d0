//! Normalize command - run the pipeline on a saved model response.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gstx_core::{InvoiceNormalizer, InvoiceRecord};

use super::output::{format_record, OutputFormat};
use super::{load_config, read_input};

/// Arguments for the normalize command.
#[derive(Args)]
pub struct NormalizeArgs {
    /// Raw model response file (default: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Report arithmetic and GSTIN inconsistencies
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: NormalizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let raw = read_input(args.input.as_deref())?;

    let normalizer = InvoiceNormalizer::from_config(&config.pipeline);
    let record = normalizer
        .normalize(&raw)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.kind()))?;

    info!("Normalized invoice with {} item(s)", record.items.len());

    if args.validate {
        report_issues(&record);
    }

    write_output(&record, args.format, args.output.as_ref())
}

/// Print consistency issues to stderr.
pub fn report_issues(record: &InvoiceRecord) {
    let issues = record.consistency_issues();
    if !issues.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
    }
}

/// Write a rendered record to a file or stdout.
pub fn write_output(
    record: &InvoiceRecord,
    format: OutputFormat,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let rendered = format_record(record, format)?;

    if let Some(output_path) = output {
        fs::write(output_path, &rendered)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    Ok(())
}
