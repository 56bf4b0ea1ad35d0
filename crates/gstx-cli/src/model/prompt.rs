//! Extraction prompts.

/// Instructions and JSON skeleton sent with every extraction request.
pub const EXTRACTION_PROMPT: &str = r#"You extract data from Indian GST invoices. Read the invoice and return the mandatory GST fields as a single JSON object.

Fields to extract:
- Supplier: name, GSTIN (15 characters), full address with state and PIN code
- Recipient: name, GSTIN, billing or shipping address
- Invoice: number, date (DD/MM/YYYY or DD-MM-YYYY), place of supply, payment terms
- Every line item: description, quantity, rate, taxable value, HSN/SAC code, CGST/SGST/IGST rate (%) and amount
- Totals: subtotal, CGST, SGST and IGST totals, total invoice value in figures and in words
- Notes: signature, bank details (account number, IFSC), other terms

Rules:
1. Reply with the JSON object only, no commentary.
2. Use null for fields that are not on the invoice.
3. Numbers must be plain JSON numbers; use 0 for zero amounts.
4. Copy HSN/SAC codes exactly as printed.
5. List each line item separately.
6. Use "Not Clear" for values you cannot read.

Structure:
```json
{
  "supplier_details": {"name": "string", "gstin": "string", "address": "string"},
  "recipient_details": {"name": "string", "gstin": "string", "address": "string"},
  "invoice_details": {"invoice_number": "string", "date": "string", "place_of_supply": "string", "terms": "string"},
  "items": [
    {
      "description": "string", "quantity": 0.0, "rate": 0.0, "taxable_value": 0.0,
      "hsn_sac_code": "string",
      "cgst_rate": 0.0, "cgst_amount": 0.0,
      "sgst_rate": 0.0, "sgst_amount": 0.0,
      "igst_rate": 0.0, "igst_amount": 0.0
    }
  ],
  "total_values": {
    "subtotal": 0.0, "cgst_total": 0.0, "sgst_total": 0.0, "igst_total": 0.0,
    "total_invoice_value_numbers": 0.0, "total_invoice_value_words": "string"
  },
  "additional_notes": {"signature": "string", "bank_details": "string", "other_notes": "string"}
}
```"#;

/// Prompt for an invoice image.
pub fn image_prompt() -> String {
    EXTRACTION_PROMPT.to_string()
}

/// Prompt for invoice text, appended under an `INVOICE TEXT:` heading.
pub fn text_prompt(invoice_text: &str) -> String {
    format!("{}\n\nINVOICE TEXT:\n{}", EXTRACTION_PROMPT, invoice_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gstx_core::pipeline::REQUIRED_SECTIONS;

    #[test]
    fn test_prompt_names_every_section() {
        for section in REQUIRED_SECTIONS {
            assert!(EXTRACTION_PROMPT.contains(&format!("\"{}\"", section)), "{}", section);
        }
    }

    #[test]
    fn test_text_prompt_appends_invoice() {
        let prompt = text_prompt("Invoice No: 42");
        assert!(prompt.starts_with(EXTRACTION_PROMPT));
        assert!(prompt.ends_with("INVOICE TEXT:\nInvoice No: 42"));
    }
}
