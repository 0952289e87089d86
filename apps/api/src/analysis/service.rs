//! Resume analysis: orchestrates a single analysis run.
//!
//! Flow: (upload → validate → extract) → input check → one LLM call →
//!       normalize (fallback on undecodable output) → Scorecard.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::normalizer::normalize;
use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::errors::AppError;
use crate::intake::extract::extract_text;
use crate::intake::validation::validate;
use crate::llm_client::CompletionBackend;
use crate::models::scorecard::Scorecard;
use crate::models::upload::UploadCandidate;

/// Result of one completed analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub analysis_id: Uuid,
    pub scorecard: Scorecard,
    /// False when the fallback scorecard was served.
    pub clean: bool,
}

#[derive(Clone)]
pub struct Analyzer {
    backend: Arc<dyn CompletionBackend>,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Analyzes already-extracted resume text.
    ///
    /// Empty or whitespace-only text is rejected before the model is called.
    /// Gateway failures propagate; undecodable output does not.
    pub async fn analyze_text(&self, resume_text: &str) -> Result<Analysis, AppError> {
        if resume_text.trim().is_empty() {
            return Err(AppError::MissingInput);
        }

        let analysis_id = Uuid::new_v4();
        info!(
            "Calling LLM for resume analysis {} ({} chars)",
            analysis_id,
            resume_text.len()
        );

        let prompt = build_analysis_prompt(resume_text);
        let raw = self.backend.complete(ANALYSIS_SYSTEM, &prompt).await?;
        debug!("Analysis {} raw model output: {}", analysis_id, raw);

        let normalized = normalize(&raw);
        if normalized.clean {
            info!(
                "Analysis {} complete: overall score {}",
                analysis_id, normalized.scorecard.overall_score
            );
        } else {
            warn!("Analysis {} served the fallback scorecard", analysis_id);
        }

        Ok(Analysis {
            analysis_id,
            scorecard: normalized.scorecard,
            clean: normalized.clean,
        })
    }

    /// Full pipeline for an uploaded file: validate, extract, analyze.
    pub async fn analyze_upload(&self, candidate: &UploadCandidate) -> Result<Analysis, AppError> {
        let format = validate(candidate)?;
        info!(
            "Accepted upload '{}' as {:?} ({} bytes)",
            candidate.file_name, format, candidate.declared_size
        );

        let text = extract_text(candidate);
        self.analyze_text(&text).await
    }
}
