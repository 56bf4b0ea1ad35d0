//! Table-driven coercion of a validated tree into an [`InvoiceRecord`].
//!
//! Each section declares its known keys and where each value lands. One
//! routine interprets those tables, so a missing, null or mistyped leaf
//! degrades to `""` or `0.0` instead of failing. Unknown keys are ignored.

use serde_json::{Map, Value};

use super::decode::Tree;
use crate::models::invoice::*;

/// Destination of a field inside a section.
pub enum Slot<T> {
    Text(fn(&mut T) -> &mut String),
    Number(fn(&mut T) -> &mut f64),
}

/// One entry of a section's field table.
pub struct Field<T> {
    pub key: &'static str,
    pub slot: Slot<T>,
}

/// A record section built from a flat JSON object.
pub trait Section: Default + 'static {
    /// Known keys of the section.
    const FIELDS: &'static [Field<Self>];

    /// Build the section from an optional JSON value.
    ///
    /// Anything other than an object yields the all-default section.
    fn coerce(value: Option<&Value>) -> Self {
        let object = value.and_then(Value::as_object);
        let mut section = Self::default();

        for field in Self::FIELDS {
            let leaf = object.and_then(|o| o.get(field.key));
            match field.slot {
                Slot::Text(slot) => *slot(&mut section) = coerce_text(leaf),
                Slot::Number(slot) => *slot(&mut section) = coerce_number(leaf),
            }
        }

        section
    }
}

/// String form of any present, non-null value; `""` otherwise.
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Finite number parsed from a number or numeric string; `0.0` otherwise.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Build the record from a structurally validated tree.
///
/// Cannot fail. If `items` is absent or empty the placeholder item is used,
/// so the non-empty invariant holds even for unvalidated input.
pub fn coerce(tree: &Tree) -> InvoiceRecord {
    let mut items: Vec<ItemDetails> = tree
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(|v| ItemDetails::coerce(Some(v))).collect())
        .unwrap_or_default();

    if items.is_empty() {
        items.push(ItemDetails::placeholder());
    }

    InvoiceRecord {
        supplier_details: SupplierDetails::coerce(tree.get("supplier_details")),
        recipient_details: RecipientDetails::coerce(tree.get("recipient_details")),
        invoice_details: InvoiceDetails::coerce(tree.get("invoice_details")),
        items,
        total_values: TotalValues::coerce(tree.get("total_values")),
        additional_notes: AdditionalNotes::coerce(tree.get("additional_notes")),
    }
}

/// Serialize a section back into a flat object using its field table.
pub fn section_to_object<T: Section + Clone>(section: &T) -> Map<String, Value> {
    let mut scratch = section.clone();
    let mut object = Map::new();

    for field in T::FIELDS {
        let value = match field.slot {
            Slot::Text(slot) => Value::String(slot(&mut scratch).clone()),
            Slot::Number(slot) => Value::from(*slot(&mut scratch)),
        };
        object.insert(field.key.to_string(), value);
    }

    object
}

impl Section for SupplierDetails {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "name", slot: Slot::Text(|s| &mut s.name) },
        Field { key: "gstin", slot: Slot::Text(|s| &mut s.gstin) },
        Field { key: "address", slot: Slot::Text(|s| &mut s.address) },
    ];
}

impl Section for RecipientDetails {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "name", slot: Slot::Text(|s| &mut s.name) },
        Field { key: "gstin", slot: Slot::Text(|s| &mut s.gstin) },
        Field { key: "address", slot: Slot::Text(|s| &mut s.address) },
    ];
}

impl Section for InvoiceDetails {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "invoice_number", slot: Slot::Text(|s| &mut s.invoice_number) },
        Field { key: "date", slot: Slot::Text(|s| &mut s.date) },
        Field { key: "place_of_supply", slot: Slot::Text(|s| &mut s.place_of_supply) },
        Field { key: "terms", slot: Slot::Text(|s| &mut s.terms) },
    ];
}

impl Section for ItemDetails {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "description", slot: Slot::Text(|s| &mut s.description) },
        Field { key: "quantity", slot: Slot::Number(|s| &mut s.quantity) },
        Field { key: "rate", slot: Slot::Number(|s| &mut s.rate) },
        Field { key: "taxable_value", slot: Slot::Number(|s| &mut s.taxable_value) },
        Field { key: "hsn_sac_code", slot: Slot::Text(|s| &mut s.hsn_sac_code) },
        Field { key: "cgst_rate", slot: Slot::Number(|s| &mut s.cgst_rate) },
        Field { key: "cgst_amount", slot: Slot::Number(|s| &mut s.cgst_amount) },
        Field { key: "sgst_rate", slot: Slot::Number(|s| &mut s.sgst_rate) },
        Field { key: "sgst_amount", slot: Slot::Number(|s| &mut s.sgst_amount) },
        Field { key: "igst_rate", slot: Slot::Number(|s| &mut s.igst_rate) },
        Field { key: "igst_amount", slot: Slot::Number(|s| &mut s.igst_amount) },
    ];
}

impl Section for TotalValues {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "subtotal", slot: Slot::Number(|s| &mut s.subtotal) },
        Field { key: "cgst_total", slot: Slot::Number(|s| &mut s.cgst_total) },
        Field { key: "sgst_total", slot: Slot::Number(|s| &mut s.sgst_total) },
        Field { key: "igst_total", slot: Slot::Number(|s| &mut s.igst_total) },
        Field {
            key: "total_invoice_value_numbers",
            slot: Slot::Number(|s| &mut s.total_invoice_value_numbers),
        },
        Field {
            key: "total_invoice_value_words",
            slot: Slot::Text(|s| &mut s.total_invoice_value_words),
        },
    ];
}

impl Section for AdditionalNotes {
    const FIELDS: &'static [Field<Self>] = &[
        Field { key: "signature", slot: Slot::Text(|s| &mut s.signature) },
        Field { key: "bank_details", slot: Slot::Text(|s| &mut s.bank_details) },
        Field { key: "other_notes", slot: Slot::Text(|s| &mut s.other_notes) },
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_text_coercion() {
        assert_eq!(coerce_text(None), "");
        assert_eq!(coerce_text(Some(&Value::Null)), "");
        assert_eq!(coerce_text(Some(&json!("Acme"))), "Acme");
        assert_eq!(coerce_text(Some(&json!(27))), "27");
        assert_eq!(coerce_text(Some(&json!(9.5))), "9.5");
        assert_eq!(coerce_text(Some(&json!(true))), "true");
        assert_eq!(coerce_text(Some(&json!(["a", 1]))), r#"["a",1]"#);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(coerce_number(None), 0.0);
        assert_eq!(coerce_number(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_number(Some(&json!(18))), 18.0);
        assert_eq!(coerce_number(Some(&json!(2.5))), 2.5);
        assert_eq!(coerce_number(Some(&json!(" 1180.50 "))), 1180.5);
        assert_eq!(coerce_number(Some(&json!("N/A"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("Not Clear"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("1,000"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&json!("inf"))), 0.0);
        assert_eq!(coerce_number(Some(&json!(true))), 0.0);
        assert_eq!(coerce_number(Some(&json!({"value": 3}))), 0.0);
    }

    #[test]
    fn test_section_ignores_unknown_keys() {
        let value = json!({
            "name": "Acme",
            "gstin": null,
            "phone": "+91 99999 99999"
        });
        let supplier = SupplierDetails::coerce(Some(&value));
        assert_eq!(
            supplier,
            SupplierDetails {
                name: "Acme".to_string(),
                gstin: String::new(),
                address: String::new(),
            }
        );
    }

    #[test]
    fn test_non_object_section_defaults() {
        assert_eq!(
            TotalValues::coerce(Some(&json!("see attached"))),
            TotalValues::default()
        );
        assert_eq!(InvoiceDetails::coerce(None), InvoiceDetails::default());
    }

    #[test]
    fn test_items_preserve_order() {
        let tree = match json!({
            "items": [
                {"description": "First", "rate": "10"},
                "garbage",
                {"description": "Third", "quantity": 3}
            ]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let record = coerce(&tree);
        let descriptions: Vec<&str> =
            record.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["First", "", "Third"]);
        assert_eq!(record.items[0].rate, 10.0);
        assert_eq!(record.items[2].quantity, 3.0);
    }

    #[test]
    fn test_missing_items_still_yield_placeholder() {
        let record = coerce(&Map::new());
        assert_eq!(record.items, vec![ItemDetails::placeholder()]);
    }

    #[test]
    fn test_field_tables_cover_serialized_keys() {
        let item = serde_json::to_value(ItemDetails::default()).unwrap();
        assert_eq!(
            item.as_object().unwrap().len(),
            ItemDetails::FIELDS.len()
        );
        let totals = serde_json::to_value(TotalValues::default()).unwrap();
        assert_eq!(
            totals.as_object().unwrap().len(),
            TotalValues::FIELDS.len()
        );
    }

    #[test]
    fn test_section_to_object_matches_serde() {
        let item = ItemDetails {
            description: "Widget".to_string(),
            rate: 100.0,
            ..ItemDetails::default()
        };
        assert_eq!(
            Value::Object(section_to_object(&item)),
            serde_json::to_value(&item).unwrap()
        );
    }
}
