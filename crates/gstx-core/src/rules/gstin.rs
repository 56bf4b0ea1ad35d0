//! GSTIN (Goods and Services Tax Identification Number) extraction and validation.

use super::patterns::{GSTIN_FORMAT, GSTIN_SCAN};
use super::{ExtractionMatch, FieldExtractor};

const CHECKSUM_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// GSTIN field extractor.
pub struct GstinExtractor {
    validate: bool,
}

impl GstinExtractor {
    /// Create a new GSTIN extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to verify the check character.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for GstinExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GstinExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for m in GSTIN_SCAN.find_iter(text) {
            let gstin = m.as_str().to_string();
            if results.iter().any(|r| r.value == gstin) {
                continue;
            }

            let confidence = if validate_gstin(&gstin, true) {
                0.9
            } else if !self.validate {
                0.5
            } else {
                continue;
            };

            results.push(
                ExtractionMatch::new(gstin, confidence, m.as_str())
                    .with_position(m.start(), m.end()),
            );
        }

        results
    }
}

/// Validate a GSTIN's format and, optionally, its check character.
pub fn validate_gstin(gstin: &str, verify_checksum: bool) -> bool {
    let gstin = gstin.trim().to_uppercase();
    if !GSTIN_FORMAT.is_match(&gstin) {
        return false;
    }
    if !verify_checksum {
        return true;
    }
    match gstin.get(..14) {
        Some(body) => checksum_char(body) == gstin.as_bytes().get(14).copied(),
        None => false,
    }
}

/// Compute the check character for the first 14 characters of a GSTIN.
///
/// Weights alternate 1, 2 over base-36 digit values; each product adds its
/// quotient and remainder by 36.
pub fn checksum_char(body: &str) -> Option<u8> {
    let mut sum = 0u32;

    for (i, c) in body.bytes().enumerate() {
        let value = CHECKSUM_ALPHABET.iter().position(|&a| a == c)? as u32;
        let product = value * if i % 2 == 0 { 1 } else { 2 };
        sum += product / 36 + product % 36;
    }

    let check = (36 - sum % 36) % 36;
    Some(CHECKSUM_ALPHABET[check as usize])
}

/// Extract the first valid GSTIN from text.
pub fn extract_gstin(text: &str) -> Option<String> {
    GstinExtractor::new().extract(text).map(|m| m.value)
}

/// Format a GSTIN for display: state code, PAN, entity code and check digit.
pub fn format_gstin(gstin: &str) -> String {
    let gstin = gstin.trim().to_uppercase();
    if gstin.len() != 15 || !gstin.is_ascii() {
        return gstin;
    }
    format!("{} {} {}", &gstin[..2], &gstin[2..12], &gstin[12..])
}

/// Two-digit state code of a GSTIN.
pub fn state_code(gstin: &str) -> Option<&str> {
    let code = gstin.trim().get(..2)?;
    code.bytes().all(|b| b.is_ascii_digit()).then_some(code)
}
