//! Core library for GST invoice extraction.
//!
//! This crate provides:
//! - The normalization pipeline turning raw model output into an [`InvoiceRecord`]
//! - GSTIN validation and keyword-based amount scanning
//! - Upload validation and image preparation for vision models
//! - Configuration shared by the CLI and HTTP server

pub mod error;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod upload;

pub use error::{GstxError, PipelineError, Result, UploadError};
pub use models::config::GstxConfig;
pub use models::invoice::{
    AdditionalNotes, InvoiceDetails, InvoiceRecord, ItemDetails, RecipientDetails,
    SupplierDetails, TotalValues,
};
pub use pipeline::{normalize, InvoiceNormalizer};
pub use rules::{scan_keywords, KeywordScan, KeywordScanner};
pub use upload::{validate_upload, ImagePreparer, PreparedImage};
