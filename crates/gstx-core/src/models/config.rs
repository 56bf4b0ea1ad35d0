//! Configuration structures for the extraction service.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GstxError, Result};

/// Main configuration for gstx.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GstxConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Extraction model configuration.
    pub model: ModelConfig,

    /// Normalization pipeline configuration.
    pub pipeline: PipelineConfig,

    /// Image upload and preparation configuration.
    pub image: ImageConfig,

    /// Keyword scanner configuration.
    pub rules: RulesConfig,

    /// Extraction store configuration.
    pub store: StoreConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,

    /// Origins allowed by CORS ("*" allows any).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Vision/text model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the generative language API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Sampling temperature. Kept low for stable JSON output.
    pub temperature: f32,

    /// Maximum tokens in a response.
    pub max_output_tokens: u32,

    /// Attempts per extraction before giving up.
    pub max_attempts: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.1,
            max_output_tokens: 4096,
            max_attempts: 3,
            timeout_secs: 120,
        }
    }
}

/// Normalization pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Characters of offending text kept in `MalformedPayload` errors.
    pub preview_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { preview_chars: 500 }
    }
}

/// Image upload and preparation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Pixel budget (width * height) for images sent to the model.
    pub max_pixels: u64,

    /// Contrast multiplier applied before upload (1.0 = unchanged).
    pub contrast: f32,

    /// Maximum accepted image file size in bytes.
    pub max_file_bytes: u64,

    /// Accepted file extensions, lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_pixels: 4 * 1024 * 1024,
            contrast: 1.2,
            max_file_bytes: 20 * 1024 * 1024,
            allowed_extensions: ["jpg", "jpeg", "png", "bmp", "tiff", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Keyword scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Verify the GSTIN check character in addition to the format.
    pub validate_gstin_checksum: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            validate_gstin_checksum: true,
        }
    }
}

/// Extraction store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum stored extractions; the oldest is evicted beyond this.
    /// `None` keeps everything for the life of the process.
    pub max_entries: Option<usize>,
}

impl GstxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| GstxError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| GstxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `GSTX_HOST`, `GSTX_PORT` and `GSTX_MODEL` overrides.
    pub fn apply_env(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("GSTX_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("GSTX_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(model) = lookup("GSTX_MODEL") {
            self.model.model = model;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: GstxConfig =
            serde_json::from_str(r#"{"server": {"port": 9000}, "store": {"max_entries": 10}}"#)
                .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.max_entries, Some(10));
        assert_eq!(config.pipeline.preview_chars, 500);
        assert_eq!(config.model.max_attempts, 3);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GstxConfig::default();
        config.apply_overrides(|key| match key {
            "GSTX_PORT" => Some("8081".to_string()),
            "GSTX_MODEL" => Some("gemini-1.5-pro".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.model.model, "gemini-1.5-pro");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_unparsable_port_is_ignored() {
        let mut config = GstxConfig::default();
        config.apply_overrides(|key| (key == "GSTX_PORT").then(|| "http".to_string()));
        assert_eq!(config.server.port, 8000);
    }
}
