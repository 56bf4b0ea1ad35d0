//! Scan command - keyword scan over OCR text.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use gstx_core::KeywordScanner;

use super::{load_config, read_input};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// OCR text file (default: stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip GSTIN check character verification
    #[arg(long)]
    no_checksum: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(args.input.as_deref())?;

    if text.trim().is_empty() {
        anyhow::bail!("Input text is empty");
    }

    let scanner = KeywordScanner::new()
        .with_checksum_validation(config.rules.validate_gstin_checksum && !args.no_checksum);
    let scan = scanner.scan(&text);
    let json = serde_json::to_string_pretty(&scan)?;

    match args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}
