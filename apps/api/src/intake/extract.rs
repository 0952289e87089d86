use crate::models::upload::UploadCandidate;

const UTF8_BOM: char = '\u{feff}';

/// Decodes the raw file content as UTF-8 text.
///
/// No format-aware parsing: PDF and Word files come through as whatever
/// their bytes decode to. Invalid sequences become U+FFFD.
pub fn extract_text(candidate: &UploadCandidate) -> String {
    let text = String::from_utf8_lossy(&candidate.content);
    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text.into_owned(),
    }
}
