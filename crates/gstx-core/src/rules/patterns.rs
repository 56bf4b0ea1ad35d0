//! Common regex patterns for GST invoice scanning.

use lazy_static::lazy_static;
use regex::Regex;

// Digit classes are spelled [0-9]: `\d` would also match non-ASCII digits.
lazy_static! {
    // GSTIN as found in running text: state code, PAN, entity code, 'Z', check char
    pub static ref GSTIN_SCAN: Regex = Regex::new(
        r"\b[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][A-Z0-9]Z[A-Z0-9]\b"
    ).unwrap();

    // Full-string GSTIN format check
    pub static ref GSTIN_FORMAT: Regex = Regex::new(
        r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$"
    ).unwrap();

    // Amounts with optional currency symbol; grouping may be Western or Indian (1,23,456)
    pub static ref AMOUNT: Regex = Regex::new(
        r"\b[$\x{20AC}\x{00A3}\x{20B9}]?[0-9]+(?:,[0-9]{2,3})*(?:\.[0-9]{1,2})?\b"
    ).unwrap();
}

/// Keywords that mark a line as carrying an amount.
pub const AMOUNT_KEYWORDS: [&str; 7] = [
    "total", "amount", "balance", "subtotal", "tax", "due", "payment",
];

/// Keywords that mark a line as carrying a tax component.
pub const TAX_KEYWORDS: [&str; 4] = ["cgst", "sgst", "igst", "tax"];

/// Keywords that tie a line to a GST registration.
pub const GST_KEYWORDS: [&str; 5] = ["gstin", "gst", "uin", "tax id", "tax identification number"];
