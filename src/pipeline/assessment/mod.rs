pub mod demo;
pub mod fallback;
pub mod gemini;
pub mod gemini_types;
pub mod orchestrator;
pub mod parser;
pub mod preprocess;
pub mod prompt;
pub mod sanitize;

pub use demo::*;
pub use fallback::*;
pub use gemini::*;
pub use gemini_types::*;
pub use orchestrator::*;
pub use parser::*;
pub use preprocess::*;
pub use prompt::*;
pub use sanitize::*;

use thiserror::Error;

/// Everything that can go wrong between receiving an image and holding a
/// trustworthy classifier answer.
///
/// None of these escape `AssessmentEngine::assess`: each one is converted to
/// a fallback result carrying `fallback_reason()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("No API credential configured for the classification service")]
    MissingCredential,

    #[error("Classification service returned error (HTTP {status}): {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Classification service returned an unreadable envelope: {0}")]
    InvalidEnvelope(String),

    #[error("Classification service returned no candidates (block reason: {block_reason:?})")]
    NoCandidates { block_reason: Option<String> },

    #[error("Classification candidate contained no text")]
    EmptyContent,

    #[error("Classification text is not a JSON object: {0}")]
    NonJsonContent(String),
}

impl AssessmentError {
    /// Human-readable reason folded into the fallback summary.
    pub fn fallback_reason(&self) -> String {
        match self {
            Self::ImageProcessing(_) => "image processing error".to_string(),
            Self::Network(_) => "network error — check internet connection".to_string(),
            Self::MissingCredential => "network error — API credential not configured".to_string(),
            Self::HttpStatus { status, .. } => format!("API error {status}"),
            Self::InvalidEnvelope(_) => "invalid API response".to_string(),
            Self::NoCandidates { .. } => "no response from AI (possible safety filter)".to_string(),
            Self::EmptyContent => "empty AI response".to_string(),
            Self::NonJsonContent(_) => "AI returned non-JSON response".to_string(),
        }
    }

    /// Stable short name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ImageProcessing(_) => "image_processing",
            Self::Network(_) => "network",
            Self::MissingCredential => "missing_credential",
            Self::HttpStatus { .. } => "http_status",
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::NoCandidates { .. } => "no_candidates",
            Self::EmptyContent => "empty_content",
            Self::NonJsonContent(_) => "non_json_content",
        }
    }
}
