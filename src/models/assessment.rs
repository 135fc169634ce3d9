use serde::{Deserialize, Serialize};

use super::enums::{Impact, Urgency};
use super::ModelError;

/// Health questionnaire answers submitted alongside the wound photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProfileAnswers")]
pub struct PatientProfile {
    pub age: u32,
    #[serde(rename = "hasHighBP")]
    pub has_high_bp: bool,
    pub has_diabetes: bool,
    /// Free text as typed by the user; may be empty.
    #[serde(default)]
    pub medications: String,
}

/// Questionnaire as submitted, before validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileAnswers {
    age: u32,
    #[serde(rename = "hasHighBP")]
    has_high_bp: bool,
    has_diabetes: bool,
    #[serde(default)]
    medications: String,
}

impl TryFrom<ProfileAnswers> for PatientProfile {
    type Error = ModelError;

    fn try_from(answers: ProfileAnswers) -> Result<Self, Self::Error> {
        Self::new(
            answers.age,
            answers.has_high_bp,
            answers.has_diabetes,
            answers.medications,
        )
    }
}

impl PatientProfile {
    pub fn new(
        age: u32,
        has_high_bp: bool,
        has_diabetes: bool,
        medications: impl Into<String>,
    ) -> Result<Self, ModelError> {
        if age == 0 {
            return Err(ModelError::InvalidAge);
        }
        Ok(Self {
            age,
            has_high_bp,
            has_diabetes,
            medications: medications.into(),
        })
    }

    /// Medication text with surrounding whitespace removed, `None` when blank.
    pub fn medications_listed(&self) -> Option<&str> {
        let trimmed = self.medications.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Encoded image ready for the classification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    /// Standard base64, no data-URI header.
    pub encoded_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecautionGroup {
    pub title: String,
    pub items: Vec<String>,
}

impl PrecautionGroup {
    pub fn new(title: &str, items: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub label: String,
    pub impact: Impact,
    pub description: String,
}

impl RiskFactor {
    pub fn new(label: impl Into<String>, impact: Impact, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            impact,
            description: description.into(),
        }
    }
}

/// Complete outcome of one assessment, AI-derived or estimated.
///
/// `used_fallback` and `ai_summary` are the only signals separating a real
/// image analysis from a profile-only estimate; callers must surface both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub wound_type: String,
    /// 0-100.
    pub severity: u8,
    pub severity_label: String,
    /// Days, always > 0.
    pub recovery_min: u32,
    /// Days, always >= `recovery_min`.
    pub recovery_max: u32,
    pub hospital_recommended: bool,
    pub urgency: Urgency,
    pub ai_summary: String,
    pub precautions: Vec<PrecautionGroup>,
    pub risk_factors: Vec<RiskFactor>,
    pub used_fallback: bool,
}
