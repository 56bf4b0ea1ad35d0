//! GST invoice record produced by the normalization pipeline.

use serde::{Deserialize, Serialize};

use crate::rules::gstin::validate_gstin;

/// Description used for the line item synthesized when a response has none.
pub const PLACEHOLDER_ITEM_DESCRIPTION: &str = "No items found";

/// Absolute tolerance for per-component total comparisons.
const AMOUNT_TOLERANCE: f64 = 0.01;

/// Grand totals are usually rounded to the rupee on printed invoices.
const GRAND_TOTAL_TOLERANCE: f64 = 1.0;

/// A complete, normalized GST invoice.
///
/// `items` is never empty when the record comes out of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub supplier_details: SupplierDetails,
    pub recipient_details: RecipientDetails,
    pub invoice_details: InvoiceDetails,
    pub items: Vec<ItemDetails>,
    pub total_values: TotalValues,
    pub additional_notes: AdditionalNotes,
}

/// Supplier (seller) identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDetails {
    pub name: String,
    /// 15-character GST identification number; format is not enforced here.
    pub gstin: String,
    pub address: String,
}

/// Recipient (buyer) identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientDetails {
    pub name: String,
    pub gstin: String,
    pub address: String,
}

/// Invoice header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetails {
    pub invoice_number: String,
    /// Free-text date as printed; formats are not canonicalized.
    pub date: String,
    pub place_of_supply: String,
    pub terms: String,
}

/// A single line item with its tax breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub description: String,
    pub quantity: f64,
    pub rate: f64,
    pub taxable_value: f64,
    pub hsn_sac_code: String,
    pub cgst_rate: f64,
    pub cgst_amount: f64,
    pub sgst_rate: f64,
    pub sgst_amount: f64,
    pub igst_rate: f64,
    pub igst_amount: f64,
}

impl ItemDetails {
    /// The line item injected when a response lists no items.
    pub fn placeholder() -> Self {
        Self {
            description: PLACEHOLDER_ITEM_DESCRIPTION.to_string(),
            ..Self::default()
        }
    }

    /// Sum of the CGST, SGST and IGST amounts on this line.
    pub fn tax_amount(&self) -> f64 {
        self.cgst_amount + self.sgst_amount + self.igst_amount
    }
}

/// Invoice totals as printed. Nothing here is recomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalValues {
    pub subtotal: f64,
    pub cgst_total: f64,
    pub sgst_total: f64,
    pub igst_total: f64,
    pub total_invoice_value_numbers: f64,
    pub total_invoice_value_words: String,
}

/// Free-text trailer of the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalNotes {
    pub signature: String,
    pub bank_details: String,
    pub other_notes: String,
}

impl InvoiceRecord {
    /// Report arithmetic and identity inconsistencies.
    ///
    /// Purely advisory: extraction is best-effort, so a record with issues is
    /// still a valid record.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.invoice_details.invoice_number.trim().is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.supplier_details.name.trim().is_empty() {
            issues.push("Missing supplier name".to_string());
        }

        for (party, gstin) in [
            ("supplier", &self.supplier_details.gstin),
            ("recipient", &self.recipient_details.gstin),
        ] {
            let gstin = gstin.trim();
            if !gstin.is_empty() && !validate_gstin(gstin, true) {
                issues.push(format!("Invalid {} GSTIN: {}", party, gstin));
            }
        }

        let totals = &self.total_values;
        let sums = [
            (
                "taxable value",
                "subtotal",
                self.items.iter().map(|i| i.taxable_value).sum::<f64>(),
                totals.subtotal,
            ),
            (
                "CGST",
                "cgst_total",
                self.items.iter().map(|i| i.cgst_amount).sum::<f64>(),
                totals.cgst_total,
            ),
            (
                "SGST",
                "sgst_total",
                self.items.iter().map(|i| i.sgst_amount).sum::<f64>(),
                totals.sgst_total,
            ),
            (
                "IGST",
                "igst_total",
                self.items.iter().map(|i| i.igst_amount).sum::<f64>(),
                totals.igst_total,
            ),
        ];

        for (label, field, calculated, stated) in sums {
            if (calculated - stated).abs() > AMOUNT_TOLERANCE {
                issues.push(format!(
                    "Line item {} ({:.2}) differs from {} ({:.2})",
                    label, calculated, field, stated
                ));
            }
        }

        let expected_total =
            totals.subtotal + totals.cgst_total + totals.sgst_total + totals.igst_total;
        if (expected_total - totals.total_invoice_value_numbers).abs() > GRAND_TOTAL_TOLERANCE {
            issues.push(format!(
                "Subtotal plus taxes ({:.2}) differs from invoice total ({:.2})",
                expected_total, totals.total_invoice_value_numbers
            ));
        }

        issues
    }
}
