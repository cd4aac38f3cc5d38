//! Input validation and sanitization.
//!
//! - Identifier checks for path and form values before they reach the store
//! - Filename sanitizing for `Content-Disposition`

/// Longest identifier accepted from clients.
const MAX_ID_LENGTH: usize = 128;

/// Longest filename echoed back to clients.
const MAX_FILENAME_LENGTH: usize = 128;

/// Validate a client-supplied document ID.
///
/// Valid format: alphanumeric characters, hyphens and underscores, 1-128 chars.
/// Rejecting `/` keeps IDs from addressing other collections.
pub fn is_valid_document_id(id: &str) -> bool {
    if id.is_empty() || id.len() > MAX_ID_LENGTH {
        return false;
    }
    id.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Reduce an uploaded filename to a safe ASCII basename.
///
/// Directory components are dropped and anything outside `[A-Za-z0-9._-]`
/// becomes `_`. Falls back to `resume` when nothing usable is left.
pub fn sanitize_filename(input: &str) -> String {
    let basename = input
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LENGTH)
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `Content-Disposition` value for serving a resume inline.
pub fn inline_disposition(original_name: &str) -> String {
    format!("inline; filename=\"{}\"", sanitize_filename(original_name))
}
