//! Rendering of invoice records for the terminal and files.

use std::fmt::Write;

use clap::ValueEnum;

use gstx_core::InvoiceRecord;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "date",
        "supplier_name",
        "supplier_gstin",
        "recipient_name",
        "recipient_gstin",
        "description",
        "hsn_sac_code",
        "quantity",
        "rate",
        "taxable_value",
        "cgst_amount",
        "sgst_amount",
        "igst_amount",
        "total_invoice_value",
    ])?;

    for item in &record.items {
        wtr.write_record([
            record.invoice_details.invoice_number.as_str(),
            &record.invoice_details.date,
            &record.supplier_details.name,
            &record.supplier_details.gstin,
            &record.recipient_details.name,
            &record.recipient_details.gstin,
            &item.description,
            &item.hsn_sac_code,
            &item.quantity.to_string(),
            &item.rate.to_string(),
            &item.taxable_value.to_string(),
            &item.cgst_amount.to_string(),
            &item.sgst_amount.to_string(),
            &item.igst_amount.to_string(),
            &record.total_values.total_invoice_value_numbers.to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

/// Human-readable report.
pub fn format_text(record: &InvoiceRecord) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_text(&mut out, record);
    out
}

fn write_text(out: &mut String, record: &InvoiceRecord) -> std::fmt::Result {
    let supplier = &record.supplier_details;
    let recipient = &record.recipient_details;
    let details = &record.invoice_details;
    let totals = &record.total_values;
    let notes = &record.additional_notes;

    writeln!(out, "GST INVOICE")?;
    writeln!(out)?;

    writeln!(out, "Supplier:")?;
    writeln!(out, "  Name:    {}", supplier.name)?;
    writeln!(out, "  GSTIN:   {}", supplier.gstin)?;
    writeln!(out, "  Address: {}", supplier.address)?;
    writeln!(out)?;

    writeln!(out, "Recipient:")?;
    writeln!(out, "  Name:    {}", recipient.name)?;
    writeln!(out, "  GSTIN:   {}", recipient.gstin)?;
    writeln!(out, "  Address: {}", recipient.address)?;
    writeln!(out)?;

    writeln!(out, "Invoice:")?;
    writeln!(out, "  Number:          {}", details.invoice_number)?;
    writeln!(out, "  Date:            {}", details.date)?;
    writeln!(out, "  Place of supply: {}", details.place_of_supply)?;
    writeln!(out, "  Terms:           {}", details.terms)?;
    writeln!(out)?;

    writeln!(out, "Items ({}):", record.items.len())?;
    for (i, item) in record.items.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, item.description)?;
        writeln!(
            out,
            "     Qty {} @ ₹{}  Taxable ₹{}  HSN/SAC {}",
            item.quantity, item.rate, item.taxable_value, item.hsn_sac_code
        )?;
        writeln!(
            out,
            "     CGST {}% (₹{})  SGST {}% (₹{})",
            item.cgst_rate, item.cgst_amount, item.sgst_rate, item.sgst_amount
        )?;
        if item.igst_rate > 0.0 {
            writeln!(out, "     IGST {}% (₹{})", item.igst_rate, item.igst_amount)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "Totals:")?;
    writeln!(out, "  Subtotal: ₹{}", totals.subtotal)?;
    writeln!(out, "  CGST:     ₹{}", totals.cgst_total)?;
    writeln!(out, "  SGST:     ₹{}", totals.sgst_total)?;
    if totals.igst_total > 0.0 {
        writeln!(out, "  IGST:     ₹{}", totals.igst_total)?;
    }
    writeln!(out, "  Total:    ₹{}", totals.total_invoice_value_numbers)?;
    if !totals.total_invoice_value_words.is_empty() {
        writeln!(out, "  In words: {}", totals.total_invoice_value_words)?;
    }

    if !notes.signature.is_empty() || !notes.bank_details.is_empty() || !notes.other_notes.is_empty() {
        writeln!(out)?;
        writeln!(out, "Notes:")?;
        writeln!(out, "  Signature:    {}", notes.signature)?;
        writeln!(out, "  Bank details: {}", notes.bank_details)?;
        writeln!(out, "  Other:        {}", notes.other_notes)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gstx_core::ItemDetails;

    fn record() -> InvoiceRecord {
        let mut record = InvoiceRecord::default();
        record.invoice_details.invoice_number = "INV-9".to_string();
        record.supplier_details.name = "Acme, Ltd".to_string();
        record.items = vec![
            ItemDetails {
                description: "Widget".to_string(),
                taxable_value: 100.0,
                ..ItemDetails::default()
            },
            ItemDetails::placeholder(),
        ];
        record.total_values.total_invoice_value_numbers = 118.0;
        record
    }

    #[test]
    fn test_csv_has_row_per_item() {
        let csv = format_record(&record(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("invoice_number,date"));
        assert!(lines[1].contains("\"Acme, Ltd\""));
        assert!(lines[2].contains("No items found"));
    }

    #[test]
    fn test_text_skips_zero_igst() {
        let text = format_text(&record());
        assert!(text.contains("Number:          INV-9"));
        assert!(text.contains("Items (2):"));
        assert!(!text.contains("IGST"));
        assert!(!text.contains("Notes:"));
    }

    #[test]
    fn test_json_round_trips() {
        let json = format_record(&record(), OutputFormat::Json).unwrap();
        let back: InvoiceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record());
    }
}
