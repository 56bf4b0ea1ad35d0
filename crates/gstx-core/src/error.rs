//! Error types for the gstx-core library.

use thiserror::Error;

/// Main error type for the gstx library.
#[derive(Error, Debug)]
pub enum GstxError {
    /// Normalization pipeline failure.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Rejected upload.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures of the normalization pipeline.
///
/// Only structural defects end up here. Field-level problems (wrong type,
/// null, unparsable numbers) are absorbed by coercion defaults.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Raw text was empty or whitespace-only.
    #[error("empty input")]
    EmptyInput,

    /// No `{...}` span could be located in the response.
    #[error("no JSON object found in response")]
    NoJsonFound,

    /// The sanitized span did not parse as a JSON object.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Offending text, truncated to the configured preview length.
        preview: String,
        /// 1-based line of the syntax error (0 when not a syntax error).
        line: usize,
        /// 1-based column of the syntax error (0 when not a syntax error).
        column: usize,
        /// Parser message.
        message: String,
    },

    /// One or more required top-level sections are absent.
    #[error("missing required section(s): {}", .0.join(", "))]
    MissingSection(Vec<String>),

    /// `items` is present but is not an array.
    #[error("items must be an array")]
    InvalidItemsType,
}

impl PipelineError {
    /// Stable identifier for the error kind, used in logs and API envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyInput => "empty_input",
            PipelineError::NoJsonFound => "no_json_found",
            PipelineError::MalformedPayload { .. } => "malformed_payload",
            PipelineError::MissingSection(_) => "missing_section",
            PipelineError::InvalidItemsType => "invalid_items_type",
        }
    }
}

/// Errors raised when validating an uploaded invoice file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The upload carried no file name.
    #[error("no file name provided")]
    MissingName,

    /// The file extension is not an accepted image format.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file exceeds the size limit.
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// Result type for the gstx library.
pub type Result<T> = std::result::Result<T, GstxError>;
