//! Extract command - send an invoice image or text to the model.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use gstx_core::models::config::GstxConfig;
use gstx_core::InvoiceRecord;

use crate::service::ExtractionService;

use super::normalize::{report_issues, write_output};
use super::output::OutputFormat;
use super::{build_model, extension_of, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Invoice image or text file
    #[arg(required = true)]
    input: PathBuf,

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

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let model = build_model(&config).ok_or_else(|| {
        anyhow::anyhow!(
            "No model available. Set {} to your Gemini API key.",
            config.model.api_key_env
        )
    })?;
    let service = ExtractionService::new(&config, Some(model));

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Extracting invoice data...");

    let result = extract_file(&service, &config, &args.input).await;
    pb.finish_and_clear();
    let record = result?;

    if args.validate {
        report_issues(&record);
    }

    write_output(&record, args.format, args.output.as_ref())?;

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Extract one file: images by extension, anything else read as text.
pub async fn extract_file(
    service: &ExtractionService,
    config: &GstxConfig,
    path: &Path,
) -> anyhow::Result<InvoiceRecord> {
    let extension = extension_of(path);
    let is_image = config.image.allowed_extensions.iter().any(|e| *e == extension);

    let record = if is_image {
        let bytes = fs::read(path)?;
        let filename = path.file_name().and_then(|n| n.to_str());
        service.extract_image(filename, &bytes).await?
    } else {
        let text = fs::read_to_string(path)?;
        service.extract_text(&text).await?
    };

    Ok(record)
}
