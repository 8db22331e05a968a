//! Captured-output truncation applied when results are stored.

/// Appended to text that was cut at the configured limit.
pub const TRUNCATION_MARKER: &str = "\n...[truncated]...";

/// Keep at most `max_chars` characters of `text`, appending
/// [`TRUNCATION_MARKER`] if anything was dropped.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character. Text at or under the limit is returned verbatim.
pub fn truncate_output(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((cut, _)) => {
            let mut kept = text;
            kept.truncate(cut);
            kept.push_str(TRUNCATION_MARKER);
            kept
        }
    }
}
