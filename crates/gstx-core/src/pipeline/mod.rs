//! Normalization pipeline: raw model text to a typed [`InvoiceRecord`].
//!
//! Stages run in order and the first failing stage aborts the run:
//! sanitize, decode, validate, coerce. Coercion cannot fail. The pipeline is
//! pure: no I/O, no logging, no shared state.

mod coerce;
mod decode;
mod sanitize;
mod validate;

pub use coerce::{coerce, coerce_number, coerce_text, section_to_object, Field, Section, Slot};
pub use decode::{decode, preview, Tree};
pub use sanitize::{sanitize, strip_fences, Sanitized};
pub use validate::{validate, REQUIRED_SECTIONS};

use crate::error::PipelineError;
use crate::models::config::PipelineConfig;
use crate::models::invoice::InvoiceRecord;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Runs the four pipeline stages over raw model output.
#[derive(Debug, Clone)]
pub struct InvoiceNormalizer {
    /// Characters of offending text kept in decode errors.
    preview_chars: usize,
}

impl InvoiceNormalizer {
    /// Create a normalizer with default settings.
    pub fn new() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    /// Create a normalizer from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            preview_chars: config.preview_chars,
        }
    }

    /// Set the preview length for malformed payload errors.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Normalize a raw model response.
    pub fn normalize(&self, raw: &str) -> Result<InvoiceRecord> {
        if raw.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let Sanitized::Object(text) = sanitize(raw) else {
            return Err(PipelineError::NoJsonFound);
        };

        let tree = decode(text, self.preview_chars)?;
        self.normalize_tree(tree)
    }

    /// Validate and coerce an already decoded tree.
    pub fn normalize_tree(&self, tree: Tree) -> Result<InvoiceRecord> {
        let tree = validate(tree)?;
        Ok(coerce(&tree))
    }
}

impl Default for InvoiceNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a raw model response with default settings.
pub fn normalize(raw: &str) -> Result<InvoiceRecord> {
    InvoiceNormalizer::new().normalize(raw)
}
