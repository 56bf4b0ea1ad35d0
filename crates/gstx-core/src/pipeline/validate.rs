//! Structural validation of the decoded tree.

use serde_json::Value;

use super::coerce::section_to_object;
use super::decode::Tree;
use crate::error::PipelineError;
use crate::models::invoice::ItemDetails;

/// Top-level sections every response must carry.
pub const REQUIRED_SECTIONS: [&str; 6] = [
    "supplier_details",
    "recipient_details",
    "invoice_details",
    "items",
    "total_values",
    "additional_notes",
];

/// Check the six sections are present and `items` is an array.
///
/// Every absent section is reported, not just the first. An empty `items`
/// array is replaced by a single placeholder item. Leaf types are left to
/// coercion.
pub fn validate(mut tree: Tree) -> Result<Tree, PipelineError> {
    let missing: Vec<String> = REQUIRED_SECTIONS
        .iter()
        .filter(|key| !tree.contains_key(**key))
        .map(|key| key.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::MissingSection(missing));
    }

    match tree.get_mut("items") {
        Some(Value::Array(items)) => {
            if items.is_empty() {
                items.push(placeholder_item());
            }
        }
        _ => return Err(PipelineError::InvalidItemsType),
    }

    Ok(tree)
}

fn placeholder_item() -> Value {
    Value::Object(section_to_object(&ItemDetails::placeholder()))
}
