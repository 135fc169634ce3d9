//! Assessment orchestrator.
//!
//! Runs preprocess → prompt → classify → parse → sanitize for one image and
//! profile. `assess` has no error return: any stage failure is converted to
//! a profile-only estimate whose summary names the failing stage.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::fallback::score_fallback;
use super::gemini::{ClassificationClient, GeminiClient};
use super::gemini_types::GenerateContentRequest;
use super::parser::{extract_candidate_text, parse_assessment_json};
use super::preprocess::{ImagePreprocessor, JpegPreprocessor, SourceImage};
use super::prompt::build_assessment_prompt;
use super::sanitize::sanitize_with_report;
use super::AssessmentError;
use crate::config::{EngineConfig, GenerationSettings};
use crate::models::{AssessmentResult, PatientProfile};

/// Stateless assessment pipeline. Safe to share across threads via `Arc`.
pub struct AssessmentEngine {
    preprocessor: Box<dyn ImagePreprocessor>,
    client: Box<dyn ClassificationClient>,
    generation: GenerationSettings,
}

impl AssessmentEngine {
    pub fn new(
        preprocessor: Box<dyn ImagePreprocessor>,
        client: Box<dyn ClassificationClient>,
        generation: GenerationSettings,
    ) -> Self {
        Self {
            preprocessor,
            client,
            generation,
        }
    }

    /// Production engine: JPEG preprocessing and the hosted classifier.
    ///
    /// Builds a blocking HTTP client, so call this outside any async runtime.
    pub fn from_config(config: &EngineConfig) -> Result<Self, AssessmentError> {
        if !config.has_credential() {
            warn!("No API credential configured; assessments will use profile-only estimates");
        }
        Ok(Self::new(
            Box::new(JpegPreprocessor::default()),
            Box::new(GeminiClient::new(config)?),
            config.generation.clone(),
        ))
    }

    /// Assess one wound image. Never fails; check `used_fallback`.
    pub fn assess(&self, image: &SourceImage, profile: &PatientProfile) -> AssessmentResult {
        let assessment_id = Uuid::new_v4();
        let _span = tracing::info_span!("assessment", %assessment_id).entered();

        match self.try_assess(image, profile) {
            Ok(result) => {
                info!(
                    severity = result.severity,
                    urgency = %result.urgency,
                    hospital = result.hospital_recommended,
                    "Assessment complete"
                );
                result
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Assessment routed to profile-only estimate");
                score_fallback(profile, &e.fallback_reason())
            }
        }
    }

    fn try_assess(
        &self,
        image: &SourceImage,
        profile: &PatientProfile,
    ) -> Result<AssessmentResult, AssessmentError> {
        let payload = self.preprocessor.prepare(image)?;
        info!(
            mime_type = %payload.mime_type,
            encoded_len = payload.encoded_data.len(),
            "Image prepared"
        );

        let request = GenerateContentRequest::for_image(
            &payload,
            build_assessment_prompt(profile),
            &self.generation,
        );
        let response = self.client.generate_content(&request)?;

        let text = extract_candidate_text(&response)?;
        let raw = parse_assessment_json(text).inspect_err(|_| {
            warn!(text_len = text.len(), "Classifier answer did not parse as JSON after fence stripping");
        })?;

        let sanitized = sanitize_with_report(&raw);
        Ok(sanitized.result)
    }

    /// Run `assess` on the blocking thread pool.
    ///
    /// The engine must have been built outside the runtime (see
    /// `from_config`). A task that panics resolves to a fallback.
    pub async fn assess_async(
        self: Arc<Self>,
        image: SourceImage,
        profile: PatientProfile,
    ) -> AssessmentResult {
        let task_profile = profile.clone();
        match tokio::task::spawn_blocking(move || self.assess(&image, &task_profile)).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Assessment task did not complete");
                score_fallback(&profile, "internal error")
            }
        }
    }
}
