//! Serve command - run the HTTP API.

use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use gstx_core::KeywordScanner;

use crate::server::{self, AppState, MemoryStore};
use crate::service::ExtractionService;

use super::{build_model, load_config};

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Interface to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let model = build_model(&config);
    if model.is_none() {
        warn!(
            "Starting without a model; extraction endpoints will return 503 until {} is set",
            config.model.api_key_env
        );
    }

    let service = ExtractionService::new(&config, model);
    if let Some(name) = service.model_name() {
        info!("Using model {}", name);
    }

    let state = AppState {
        service: Arc::new(service),
        store: Arc::new(MemoryStore::with_max_entries(config.store.max_entries)),
        scanner: KeywordScanner::new().with_checksum_validation(config.rules.validate_gstin_checksum),
        max_upload_bytes: config.server.max_upload_bytes,
    };

    server::serve(state, &config.server).await
}
