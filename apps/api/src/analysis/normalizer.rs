//! Turns free-form model output into a Scorecard.
//!
//! The model is asked for JSON but may wrap it in a ```json fence, surround it
//! with prose, or return something that is not JSON at all. Candidate
//! selection, first match wins:
//!
//! 1. interior of a ```json fenced block
//! 2. first `{` through last `}`
//! 3. the raw text
//!
//! A candidate that does not decode as a full Scorecard is replaced by
//! `Scorecard::fallback()`. Decode failure is logged, never returned.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::models::scorecard::Scorecard;

static JSON_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```json\r?\n(.*?)\r?\n```").expect("valid regex"));

static BRACE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    FencedBlock,
    BraceSpan,
    Raw,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub scorecard: Scorecard,
    /// False when the fallback scorecard was substituted.
    pub clean: bool,
}

/// Picks the substring of `raw` most likely to hold the scorecard JSON.
pub fn select_candidate(raw: &str) -> (&str, CandidateSource) {
    if let Some(inner) = JSON_FENCE_RE.captures(raw).and_then(|c| c.get(1)) {
        return (inner.as_str(), CandidateSource::FencedBlock);
    }
    if let Some(span) = BRACE_SPAN_RE.find(raw) {
        return (span.as_str(), CandidateSource::BraceSpan);
    }
    (raw, CandidateSource::Raw)
}

pub fn normalize(raw: &str) -> Normalized {
    let (candidate, source) = select_candidate(raw);

    match serde_json::from_str::<Scorecard>(candidate) {
        Ok(scorecard) => {
            for (field, score) in scorecard.out_of_range_scores() {
                warn!("Model returned {field}={score} outside 0-100; passing through");
            }
            Normalized {
                scorecard,
                clean: true,
            }
        }
        Err(e) => {
            warn!(
                "Could not decode model output ({:?} candidate, {} chars): {e}; using fallback scorecard",
                source,
                candidate.len()
            );
            Normalized {
                scorecard: Scorecard::fallback(),
                clean: false,
            }
        }
    }
}
