//! Amount extraction for keyword-scanned invoice lines.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT;
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor.
///
/// Numbers directly followed by `%` are tax rates, not amounts, and are
/// skipped.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        AMOUNT
            .find_iter(text)
            .filter(|m| !text[m.end()..].trim_start().starts_with('%'))
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.6, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Raw amount strings on a line, in order of appearance.
pub fn extract_amounts(line: &str) -> Vec<String> {
    AmountExtractor::new()
        .extract_all(line)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

/// Parse an amount such as `₹1,23,456.50`, `$1,234` or `99.5`.
///
/// Currency symbols and grouping commas are dropped.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Format an amount with Indian digit grouping (`12,34,567.89`).
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = if integer.len() <= 3 {
        integer.to_string()
    } else {
        let (head, tail) = integer.split_at(integer.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_amounts() {
        assert_eq!(
            extract_amounts("Total Amount Due 1,180.00 (incl. 18.00 tax)"),
            vec!["1,180.00", "18.00"]
        );
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(extract_amounts("Grand Total ₹1,23,456.50"), vec!["1,23,456.50"]);
    }

    #[test]
    fn test_rates_are_skipped() {
        assert_eq!(extract_amounts("CGST @ 9% 90.00"), vec!["90.00"]);
        assert_eq!(extract_amounts("SGST 9 % 90.00"), vec!["90.00"]);
    }

    #[test]
    fn test_gstin_digits_are_not_amounts() {
        assert!(extract_amounts("GSTIN: 27AAPFU0939F1ZV").is_empty());
    }

    #[test]
    fn test_non_ascii_digits_are_not_amounts() {
        assert!(extract_amounts("Total: १२3").is_empty());
        assert!(extract_amounts("Total: १,२३४.००").is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,180.00"), Some(Decimal::new(118000, 2)));
        assert_eq!(parse_amount("₹1,23,456.50"), Some(Decimal::new(12345650, 2)));
        assert_eq!(parse_amount("$99"), Some(Decimal::new(99, 0)));
        assert_eq!(parse_amount("N/A"), None);
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(Decimal::new(123456789, 2)), "12,34,567.89");
        assert_eq!(format_inr(Decimal::new(99950, 2)), "999.50");
        assert_eq!(format_inr(Decimal::new(100000, 0)), "1,00,000.00");
        assert_eq!(format_inr(Decimal::new(-150000, 2)), "-1,500.00");
    }
}
