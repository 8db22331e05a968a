//! Input validation for submitted prompts.

use crate::error::CoreError;

/// Normalise and validate a submitted prompt.
///
/// Surrounding whitespace is trimmed first; the result must be non-empty and
/// at most `max_chars` characters long.
pub fn validate_prompt(raw: &str, max_chars: usize) -> Result<String, CoreError> {
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Err(CoreError::Validation("prompt is required".into()));
    }
    if prompt.chars().count() > max_chars {
        return Err(prompt_too_long(max_chars));
    }
    Ok(prompt.to_string())
}

/// The error for a prompt over `max_chars`, also used when the request
/// body is too large to hold any acceptable prompt.
pub fn prompt_too_long(max_chars: usize) -> CoreError {
    CoreError::Validation(format!("prompt too long (max {max_chars} chars)"))
}
