//! Best-effort helpers for pulling JSON out of free-form model replies.

use std::sync::OnceLock;

use regex::Regex;

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

fn fenced_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").expect("fenced object regex is valid")
    })
}

/// Returns the slice from the first `{` to the last `}`, if both exist in that order.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Locates the JSON object a model embedded in its reply.
///
/// Order: object inside a fenced code block, then first `{` to last `}`,
/// then the trimmed text as-is. The caller still has to parse the result.
pub fn extract_json_object(text: &str) -> &str {
    let text = text.trim();
    if let Some(inner) = fenced_object_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        return inner;
    }
    brace_span(text).unwrap_or(text)
}
