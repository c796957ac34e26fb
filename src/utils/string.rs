//! UTF-8 safe string helpers

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters, not bytes, so multi-byte text (journal entries are
/// full of it) is never split inside a code point.
///
/// ```
/// use recapitan_core::utils::string::truncate_at_char_boundary;
///
/// assert_eq!(truncate_at_char_boundary("rate limit exceeded", 10), "rate limit...");
/// assert_eq!(truncate_at_char_boundary("ok", 10), "ok");
/// ```
pub fn truncate_at_char_boundary(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
        None => s.to_string(),
    }
}
