//! Keyword scanner over OCR text.
//!
//! A weak, line-oriented heuristic: it finds GSTINs and amounts next to
//! tax keywords. Results are always low confidence and are never merged into
//! an [`InvoiceRecord`](crate::models::invoice::InvoiceRecord).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::amounts::{extract_amounts, parse_amount};
use super::gstin::{validate_gstin, GstinExtractor};
use super::patterns::{AMOUNT_KEYWORDS, GST_KEYWORDS, TAX_KEYWORDS};
use super::FieldExtractor;

/// Context recorded for a GSTIN whose line carries no GST keyword.
pub const DEFAULT_GSTIN_CONTEXT: &str = "GSTIN found in the document";

/// Confidence tier of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
}

/// Everything the keyword scanner found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordScan {
    pub confidence: Confidence,
    pub gstins: Vec<GstinHit>,
    pub amounts: Vec<KeywordLine>,
    pub tax_amounts: Vec<KeywordLine>,
    pub summary: TaxSummary,
}

/// A GSTIN found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstinHit {
    pub gstin: String,
    pub context: String,
    pub valid: bool,
}

/// A line matched by a keyword, with the amounts found on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordLine {
    pub keyword: String,
    pub line: String,
    pub amounts: Vec<String>,
}

/// Tax totals derived from keyword lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSummary {
    /// Largest amount on any amount-keyword line.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount_with_gst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub igst: Decimal,
}

/// Line-oriented keyword scanner.
#[derive(Debug, Clone, Copy)]
pub struct KeywordScanner {
    verify_checksum: bool,
}

impl KeywordScanner {
    /// Create a scanner that verifies GSTIN check characters.
    pub fn new() -> Self {
        Self {
            verify_checksum: true,
        }
    }

    /// Set whether GSTIN check characters are verified.
    pub fn with_checksum_validation(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }

    /// Scan OCR text.
    pub fn scan(&self, text: &str) -> KeywordScan {
        let amounts = keyword_lines(text, &AMOUNT_KEYWORDS);
        let tax_amounts = keyword_lines(text, &TAX_KEYWORDS);
        let gstins = self.find_gstins(text);
        let summary = summarize(&amounts, &tax_amounts);

        debug!(
            gstins = gstins.len(),
            amount_lines = amounts.len(),
            tax_lines = tax_amounts.len(),
            "keyword scan complete"
        );

        KeywordScan {
            confidence: Confidence::Low,
            gstins,
            amounts,
            tax_amounts,
            summary,
        }
    }

    fn find_gstins(&self, text: &str) -> Vec<GstinHit> {
        GstinExtractor::new()
            .with_validation(false)
            .extract_all(text)
            .into_iter()
            .map(|m| {
                let (start, _) = m.position.unwrap_or((0, 0));
                let line = line_around(text, start).trim();
                let lowered = line.to_lowercase();
                let context = if GST_KEYWORDS.iter().any(|k| lowered.contains(k)) {
                    line.to_string()
                } else {
                    DEFAULT_GSTIN_CONTEXT.to_string()
                };

                GstinHit {
                    valid: validate_gstin(&m.value, self.verify_checksum),
                    gstin: m.value,
                    context,
                }
            })
            .collect()
    }
}

impl Default for KeywordScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan OCR text with default settings.
pub fn scan_keywords(text: &str) -> KeywordScan {
    KeywordScanner::new().scan(text)
}

/// Every (keyword, line) pair where the line mentions the keyword and holds
/// at least one amount. A line can match several keywords.
fn keyword_lines(text: &str, keywords: &[&str]) -> Vec<KeywordLine> {
    let mut lines = Vec::new();

    for line in text.lines() {
        let lowered = line.to_lowercase();
        for keyword in keywords {
            if !lowered.contains(keyword) {
                continue;
            }
            let amounts = extract_amounts(line);
            if !amounts.is_empty() {
                lines.push(KeywordLine {
                    keyword: keyword.to_string(),
                    line: line.trim().to_string(),
                    amounts,
                });
            }
        }
    }

    lines
}

fn summarize(amounts: &[KeywordLine], tax_amounts: &[KeywordLine]) -> TaxSummary {
    let mut summary = TaxSummary::default();

    for entry in amounts {
        for amount in entry.amounts.iter().filter_map(|a| parse_amount(a)) {
            summary.total_amount_with_gst = summary.total_amount_with_gst.max(amount);
        }
    }

    for entry in tax_amounts {
        let slot = match entry.keyword.as_str() {
            "cgst" => &mut summary.cgst,
            "sgst" => &mut summary.sgst,
            "igst" => &mut summary.igst,
            _ => continue,
        };
        for amount in entry.amounts.iter().filter_map(|a| parse_amount(a)) {
            *slot += amount;
        }
    }

    summary
}

fn line_around(text: &str, offset: usize) -> &str {
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    &text[start..end]
}
