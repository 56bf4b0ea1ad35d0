//! Strict JSON decoding of a sanitized response.

use serde_json::{Map, Value};

use crate::error::PipelineError;

/// Generic key/value tree produced by the decoder.
pub type Tree = Map<String, Value>;

/// Parse `text` as a JSON object.
///
/// Syntax errors and non-object payloads both become
/// [`PipelineError::MalformedPayload`] with a preview of at most
/// `preview_chars` characters.
pub fn decode(text: &str, preview_chars: usize) -> Result<Tree, PipelineError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(tree)) => Ok(tree),
        Ok(other) => Err(PipelineError::MalformedPayload {
            preview: preview(text, preview_chars),
            line: 0,
            column: 0,
            message: format!("expected a JSON object, found {}", value_kind(&other)),
        }),
        Err(e) => Err(PipelineError::MalformedPayload {
            preview: preview(text, preview_chars),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        }),
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
