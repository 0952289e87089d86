use thiserror::Error;

use crate::models::upload::UploadCandidate;

/// Upper bound on upload size (5 MiB). Zero-length files are accepted.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Maps a declared content type to an accepted format.
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "application/msword" => Some(Self::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("Please upload a PDF, DOC, DOCX, or TXT file")]
    InvalidFileType { mime_type: String },

    #[error("Please upload a file smaller than 5MB")]
    FileTooLarge { size: u64 },
}

/// Accepts or rejects a candidate by declared type, then size.
pub fn validate(candidate: &UploadCandidate) -> Result<DocumentFormat, IntakeError> {
    let format = DocumentFormat::from_mime(&candidate.mime_type).ok_or_else(|| {
        IntakeError::InvalidFileType {
            mime_type: candidate.mime_type.clone(),
        }
    })?;

    if candidate.declared_size > MAX_UPLOAD_BYTES {
        return Err(IntakeError::FileTooLarge {
            size: candidate.declared_size,
        });
    }

    Ok(format)
}
