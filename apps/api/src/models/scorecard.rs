use serde::{de, Deserialize, Deserializer, Serialize};

/// Normalized resume analysis result handed to the presentation layer.
///
/// Scores are expected in 0–100 but are not clamped: whatever the model
/// returned is passed through. Every field is required on decode, so a
/// partially populated scorecard can never be constructed from model output.
/// Scores may arrive as `85` or `85.0`; a fractional part is a decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    #[serde(deserialize_with = "whole_number")]
    pub overall_score: i64,
    #[serde(deserialize_with = "whole_number")]
    pub ats_score: i64,
    #[serde(deserialize_with = "whole_number")]
    pub skills_score: i64,
    #[serde(deserialize_with = "whole_number")]
    pub experience_score: i64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub keywords: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Scorecard {
    /// The fixed scorecard substituted when model output cannot be decoded.
    pub fn fallback() -> Self {
        Self {
            overall_score: 70,
            ats_score: 65,
            skills_score: 70,
            experience_score: 75,
            strengths: to_strings(&[
                "Resume contains relevant professional experience",
                "Clear structure and formatting",
                "Good use of action verbs",
            ]),
            improvements: to_strings(&[
                "Add more quantifiable achievements",
                "Include more industry-specific keywords",
                "Optimize formatting for ATS systems",
            ]),
            keywords: to_strings(&[
                "Professional",
                "Experience",
                "Skills",
                "Education",
                "Management",
                "Leadership",
                "Communication",
                "Problem-solving",
            ]),
            suggestions: to_strings(&[
                "Add metrics and numbers to quantify your achievements",
                "Include a professional summary at the top",
                "Tailor your resume to specific job descriptions",
                "Use standard section headings for better ATS compatibility",
            ]),
        }
    }

    /// Named scores that fall outside 0–100.
    pub fn out_of_range_scores(&self) -> Vec<(&'static str, i64)> {
        [
            ("overallScore", self.overall_score),
            ("atsScore", self.ats_score),
            ("skillsScore", self.skills_score),
            ("experienceScore", self.experience_score),
        ]
        .into_iter()
        .filter(|(_, score)| !(0..=100).contains(score))
        .collect()
    }
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(de::Error::custom(format!(
            "score must be a whole number, got {number}"
        ))),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
