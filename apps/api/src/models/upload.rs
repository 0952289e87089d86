use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file as selected by the user, before validation.
///
/// `declared_size` is what the caller reports; on the server path it is the
/// byte length of the received content.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub content: Bytes,
    pub mime_type: String,
    pub declared_size: u64,
    pub file_name: String,
}

impl UploadCandidate {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            declared_size: content.len() as u64,
            content,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }
}

/// Body of `POST /api/v1/analyze-resume`.
///
/// An absent or `null` `resumeText` decodes to `None` and is reported as
/// missing input, the same as an empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "resumeText", default)]
    pub resume_text: Option<String>,
}

impl AnalysisRequest {
    pub fn new(resume_text: impl Into<String>) -> Self {
        Self {
            resume_text: Some(resume_text.into()),
        }
    }

    /// The submitted text, empty when none was sent.
    pub fn text(&self) -> &str {
        self.resume_text.as_deref().unwrap_or_default()
    }
}
