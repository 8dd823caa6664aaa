//! Store path helpers.

use crate::error::AppError;
use crate::result::AppResult;

/// Characters the hosted database forbids inside a key.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Normalize a slash-separated path: trims surrounding slashes and rejects
/// empty segments or forbidden characters. The root is the empty string.
pub fn normalize(path: &str) -> AppResult<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    for segment in trimmed.split('/') {
        if segment.is_empty() {
            return Err(AppError::validation(format!(
                "Path '{path}' contains an empty segment"
            )));
        }
        if segment.contains(FORBIDDEN) || segment.chars().any(char::is_control) {
            return Err(AppError::validation(format!(
                "Path segment '{segment}' contains a forbidden character"
            )));
        }
    }
    Ok(trimmed.to_string())
}

/// Split a normalized path into its segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
