//! Item name sanitization.
//!
//! Item names become path components of every artifact in the chain
//! (`{name}_summary.txt`, `{name}.png`, ...), so they are reduced to a
//! filesystem-safe token before any path is constructed.

use crate::error::CoreError;

/// Maximum length of an item name.
const MAX_NAME_LEN: usize = 128;

/// Reduce an item name to a filesystem-safe token.
///
/// Rules:
/// - Leading/trailing whitespace is trimmed.
/// - Must not be empty and must not exceed `MAX_NAME_LEN` characters.
/// - Alphanumeric, hyphen, underscore, and dot characters pass through;
///   everything else becomes a hyphen.
/// - A leading dot becomes a hyphen (no hidden files).
/// - Must retain at least one alphanumeric character.
pub fn sanitize_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Item name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Item name must not exceed {MAX_NAME_LEN} characters"
        )));
    }

    let mut out: String = trimmed
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if !out.chars().any(|c| c.is_alphanumeric()) {
        return Err(CoreError::Validation(
            "Item name must contain at least one alphanumeric character".to_string(),
        ));
    }

    if out.starts_with('.') {
        out.replace_range(..1, "-");
    }

    Ok(out)
}
