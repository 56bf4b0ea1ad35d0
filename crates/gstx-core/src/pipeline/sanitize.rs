//! Recovery of the JSON object embedded in a free-form model response.

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Outcome of sanitizing a raw response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitized<'a> {
    /// Span starting at the first `{`. Ends at the last `}` when one follows,
    /// otherwise runs to the end of the text (truncated response).
    Object(&'a str),
    /// No `{` anywhere; the text is returned unmodified.
    Unstructured(&'a str),
}

impl<'a> Sanitized<'a> {
    /// The sanitized text.
    pub fn as_str(&self) -> &'a str {
        match self {
            Sanitized::Object(s) | Sanitized::Unstructured(s) => s,
        }
    }

    /// Whether an object span was located.
    pub fn is_object(&self) -> bool {
        matches!(self, Sanitized::Object(_))
    }
}

/// Strip markdown fences and surrounding prose from a model response.
///
/// Only the first `{` and the last `}` are used; braces are not balanced, so
/// a response holding two objects yields a span that fails to decode.
pub fn sanitize(raw: &str) -> Sanitized<'_> {
    let text = strip_fences(raw);

    let Some(start) = text.find('{') else {
        return Sanitized::Unstructured(raw);
    };

    match text.rfind('}') {
        Some(end) if end > start => Sanitized::Object(&text[start..=end]),
        _ => Sanitized::Object(text[start..].trim_end()),
    }
}

/// Return the interior of the first fenced block, preferring a `json` fence.
pub fn strip_fences(raw: &str) -> &str {
    let marker = if raw.contains(JSON_FENCE) {
        JSON_FENCE
    } else if raw.contains(FENCE) {
        FENCE
    } else {
        return raw;
    };

    let Some(open) = raw.find(marker) else {
        return raw;
    };
    let body = &raw[open + marker.len()..];

    match body.find(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fence_with_prose() {
        let raw = "Here is the data:\n```json\n{\"a\":1}\n```\nThanks";
        assert_eq!(sanitize(raw), Sanitized::Object("{\"a\":1}"));
    }

    #[test]
    fn test_generic_fence() {
        let raw = "```\n{\"b\": [1, 2]}\n```";
        assert_eq!(sanitize(raw).as_str(), "{\"b\": [1, 2]}");
    }

    #[test]
    fn test_generic_fence_with_language_tag() {
        let raw = "```javascript\n{\"c\": true}\n```";
        assert_eq!(sanitize(raw).as_str(), "{\"c\": true}");
    }

    #[test]
    fn test_leading_and_trailing_commentary() {
        let raw = "Sure! {\"x\": {\"y\": 2}} Let me know if you need more.";
        assert_eq!(sanitize(raw).as_str(), "{\"x\": {\"y\": 2}}");
    }

    #[test]
    fn test_nearest_closing_fence_is_used() {
        let raw = "```json\n{\"a\":1}\n```\nand also\n```\nnotes\n```";
        assert_eq!(strip_fences(raw), "{\"a\":1}");
    }

    #[test]
    fn test_unclosed_fence_keeps_remainder() {
        let raw = "```json\n{\"a\": 1}";
        assert_eq!(sanitize(raw).as_str(), "{\"a\": 1}");
    }

    #[test]
    fn test_no_braces_is_unstructured() {
        let raw = "I cannot read this invoice.";
        let sanitized = sanitize(raw);
        assert!(!sanitized.is_object());
        assert_eq!(sanitized.as_str(), raw);
    }

    #[test]
    fn test_truncated_object_keeps_tail() {
        let raw = "{\"supplier_details\": {\"name\": \"Acme\"";
        assert_eq!(sanitize(raw), Sanitized::Object(raw));
    }

    #[test]
    fn test_multiple_objects_are_not_balanced() {
        let raw = "{\"a\": 1} and {\"b\": 2}";
        assert_eq!(sanitize(raw).as_str(), raw);
    }
}
