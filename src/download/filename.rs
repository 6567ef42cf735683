//! Filename sanitization and page naming.
//!
//! Document titles and ids come from the network and end up as directory,
//! archive and state-file names, so they are made filesystem-safe here.

use std::path::Component;
use std::path::Path;

/// Sanitizes a name for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
/// plus control characters. Trailing dots and spaces are dropped.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let sanitized = sanitized.trim_end_matches(['.', ' ']).trim_start();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(sanitized) {
        sanitized.to_string()
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Lowercased media type without parameters (`image/png; q=1` → `image/png`).
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// File extension for an accepted page image content type.
///
/// Only PNG and JPEG pages are accepted; anything else returns `None`.
#[must_use]
pub fn page_image_extension(content_type: &str) -> Option<&'static str> {
    match media_type(content_type).as_str() {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        _ => None,
    }
}

/// Name of the file holding page `index` (zero-based).
#[must_use]
pub fn page_file_name(index: usize, extension: &str) -> String {
    format!("page{index}.{extension}")
}
