//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod scan;
pub mod serve;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use gstx_core::GstxConfig;

use crate::model::{GeminiClient, InvoiceModel};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gstx")
        .join("config.json")
}

/// Load configuration from `--config`, the default location, or defaults,
/// then apply environment overrides.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<GstxConfig> {
    let config = match config_path {
        Some(path) => GstxConfig::from_file(Path::new(path))?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                debug!("Loading config from {}", default_path.display());
                GstxConfig::from_file(&default_path)?
            } else {
                GstxConfig::default()
            }
        }
    };

    Ok(config.apply_env())
}

/// Read an input file, or stdin when the path is absent or `-`.
pub fn read_input(input: Option<&Path>) -> anyhow::Result<String> {
    match input {
        Some(path) if path != Path::new("-") => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            Ok(std::fs::read_to_string(path)?)
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Build the configured model, or `None` when no API key is available.
pub fn build_model(config: &GstxConfig) -> Option<Arc<dyn InvoiceModel>> {
    match GeminiClient::from_config(&config.model) {
        Ok(client) => {
            let model: Arc<dyn InvoiceModel> = Arc::new(client);
            Some(model)
        }
        Err(e) => {
            warn!("Model unavailable: {}", e);
            None
        }
    }
}

/// Lowercase extension of a path.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
