//! Rule-based extraction for GST invoices: GSTINs, amounts, keyword scanning.

pub mod amounts;
pub mod gstin;
pub mod patterns;
pub mod scanner;

pub use amounts::{extract_amounts, format_inr, parse_amount, AmountExtractor};
pub use gstin::{extract_gstin, format_gstin, state_code, validate_gstin, GstinExtractor};
pub use scanner::{scan_keywords, Confidence, GstinHit, KeywordLine, KeywordScan, KeywordScanner, TaxSummary};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
