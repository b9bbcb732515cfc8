//! Mime-type derivation for file entries.
//!
//! The protocol carries no content-type information, so the type is
//! derived from the file extension alone.

/// Mime type for a file name; unknown extensions fall back to
/// `application/octet-stream`.
pub fn mime_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
