//! String utilities for the domain layer.

/// Truncate a string to approximately `max_bytes` without splitting a UTF-8
/// character boundary.
fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Cut `text` back to the last complete sentence that fits in `max_bytes`.
///
/// Falls back to a hard cut with an ellipsis when no sentence terminator
/// appears in the window.
pub fn sentence_excerpt(text: &str, max_bytes: usize) -> String {
    let text = text.trim();
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let window = truncate_str(text, max_bytes);
    match window.rfind(['.', '!', '?']) {
        Some(idx) if idx > 0 => window[..=idx].to_string(),
        _ => format!("{}...", window.trim_end()),
    }
}
