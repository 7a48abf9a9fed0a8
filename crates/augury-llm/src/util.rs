//! Common utilities for completion providers

/// Minimum key length to display partial key
const MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY: usize = 8;

/// Number of characters to show at start/end of masked key
const KEY_MASK_VISIBLE_CHARS: usize = 4;

/// Mask API key for safe display in logs
///
/// Shows first 4 and last 4 characters for keys longer than 8 characters,
/// otherwise shows "****" to prevent exposure of short keys.
///
/// # Examples
/// ```
/// use augury_llm::util::mask_api_key;
/// assert_eq!(mask_api_key("AIzaSy1234567890abcdef"), "AIza...cdef");
/// assert_eq!(mask_api_key("short"), "****");
/// ```
#[must_use]
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MIN_KEY_LENGTH_FOR_PARTIAL_DISPLAY {
        return "****".to_string();
    }
    let head: String = chars[..KEY_MASK_VISIBLE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - KEY_MASK_VISIBLE_CHARS..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Truncate a string to at most `max_chars` characters without splitting a code point
#[must_use]
pub fn truncate_safe(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Sanitize an upstream error message before it is logged or surfaced
///
/// Strips `key=` query parameters (Gemini puts the API key in the URL) and
/// caps the length.
#[must_use]
pub fn sanitize_error(error: &str) -> String {
    let mut cleaned = String::with_capacity(error.len());
    let mut rest = error;
    while let Some(pos) = rest.find("key=") {
        cleaned.push_str(&rest[..pos]);
        cleaned.push_str("key=****");
        let tail = &rest[pos + 4..];
        let end = tail
            .find(|c: char| matches!(c, '&' | '"' | ')') || c.is_whitespace())
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    cleaned.push_str(rest);

    if cleaned.chars().count() > 300 {
        format!("{}...(truncated)", truncate_safe(&cleaned, 300))
    } else {
        cleaned
    }
}
