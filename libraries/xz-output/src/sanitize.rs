//! Sanitization of user-supplied path segments
//!
//! Subfolders must be a single segment: separators and parent references are
//! rejected outright. Filename prefixes never reject on separators; they are
//! replaced so a prefix can't introduce a directory.

use crate::error::{OutputError, Result};

/// Names Windows refuses regardless of extension
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitize a subfolder name
///
/// Empty (or all-whitespace) input means "the output root itself" and yields
/// an empty string.
///
/// # Errors
/// `InvalidPath` if the input contains `/`, `\` or `..`, or if nothing safe
/// is left after replacing disallowed characters.
pub fn sanitize_subfolder(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }
    if raw.contains('/') || raw.contains('\\') {
        return Err(OutputError::InvalidPath(format!(
            "subfolder '{}' must be a single folder name without path separators",
            raw
        )));
    }
    if raw.contains("..") {
        return Err(OutputError::InvalidPath(format!(
            "subfolder '{}' must not reference a parent directory",
            raw
        )));
    }

    let segment = clean_segment(raw);
    if segment.is_empty() {
        return Err(OutputError::InvalidPath(format!(
            "subfolder '{}' has no usable characters",
            raw
        )));
    }
    Ok(segment)
}

/// Sanitize a filename prefix (placeholders already expanded)
///
/// # Errors
/// `InvalidPath` if nothing safe is left.
pub fn sanitize_filename_prefix(raw: &str) -> Result<String> {
    let segment = clean_segment(raw);
    if segment.is_empty() {
        return Err(OutputError::InvalidPath(format!(
            "filename prefix '{}' has no usable characters",
            raw
        )));
    }
    Ok(segment)
}

fn clean_segment(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            // Separators and parent references
            '/' | '\\' | '.' | '~' => '_',
            // Invalid on Windows: < > : " | ? *
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim().trim_matches('_').trim();

    if RESERVED_NAMES.contains(&trimmed.to_uppercase().as_str()) {
        format!("_{}", trimmed)
    } else {
        trimmed.to_string()
    }
}
