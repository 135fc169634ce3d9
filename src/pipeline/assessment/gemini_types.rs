//! Wire types for the `generateContent` endpoint.
//!
//! Request types serialize exactly what the endpoint expects. Response types
//! are deliberately lenient (every field optional) because the envelope is
//! untrusted; the orchestrator decides what a missing field means.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GenerationSettings;
use crate::models::ImagePayload;

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

/// One multimodal part: inline image data or text.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&GenerationSettings> for GenerationConfig {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetySetting {
    pub category: &'static str,
    pub threshold: &'static str,
}

/// Harm categories relaxed for clinical imagery (open wounds, blood, burns
/// are routinely flagged otherwise).
pub const RELAXED_HARM_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub fn clinical_safety_settings() -> Vec<SafetySetting> {
    RELAXED_HARM_CATEGORIES
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
}

impl GenerateContentRequest {
    /// Single-turn request: image first, then the instruction text.
    pub fn for_image(
        image: &ImagePayload,
        instruction: String,
        settings: &GenerationSettings,
    ) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.encoded_data.clone(),
                        },
                    },
                    RequestPart::Text { text: instruction },
                ],
            }],
            generation_config: settings.into(),
            safety_settings: clinical_safety_settings(),
        }
    }
}

// ──────────────────────────────────────────────
// Response
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Read an already-parsed body, field by field.
    ///
    /// A non-object body or a non-array `candidates` reads as no candidates.
    /// A candidate that is null or malformed reads as an empty candidate.
    pub fn from_json(value: &Value) -> Self {
        let candidates = value.get("candidates").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|c| Candidate::deserialize(c).unwrap_or_default())
                .collect()
        });
        let prompt_feedback = value
            .get("promptFeedback")
            .and_then(|f| PromptFeedback::deserialize(f).ok());

        Self {
            candidates,
            prompt_feedback,
        }
    }

    pub fn has_candidates(&self) -> bool {
        self.candidates.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Text of the first part of the first candidate, or "" when absent.
    pub fn first_text(&self) -> &str {
        self.candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.as_ref())
            .and_then(|p| p.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or("")
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ImagePayload {
        ImagePayload {
            mime_type: "image/jpeg".into(),
            encoded_data: "/9j/4AAQ".into(),
        }
    }

    #[test]
    fn request_serializes_to_endpoint_shape() {
        let request = GenerateContentRequest::for_image(
            &payload(),
            "Assess this wound".into(),
            &GenerationSettings::default(),
        );
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[0]["inline_data"]["data"], "/9j/4AAQ");
        assert_eq!(parts[1]["text"], "Assess this wound");

        let config = &json["generationConfig"];
        assert!((config["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!((config["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(config["maxOutputTokens"], 2048);
    }

    #[test]
    fn safety_settings_relax_all_four_categories() {
        let settings = clinical_safety_settings();
        assert_eq!(settings.len(), 4);
        assert!(settings.iter().all(|s| s.threshold == "BLOCK_NONE"));
        assert!(settings
            .iter()
            .any(|s| s.category == "HARM_CATEGORY_DANGEROUS_CONTENT"));
    }

    #[test]
    fn first_text_reads_first_candidate_first_part() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "other"}]}}
            ]}"#,
        )
        .unwrap();
        assert!(response.has_candidates());
        assert_eq!(response.first_text(), "first");
    }

    #[test]
    fn missing_pieces_yield_empty_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(response.has_candidates());
        assert_eq!(response.first_text(), "");
    }

    #[test]
    fn blocked_prompt_has_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"promptFeedback": {"blockReason": "SAFETY", "safetyRatings": []}}"#,
        )
        .unwrap();
        assert!(!response.has_candidates());
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn null_candidate_reads_as_empty() {
        let response = GenerateContentResponse::from_json(&serde_json::json!({
            "candidates": [null, {"content": {"parts": [{"text": "second"}]}}]
        }));
        assert!(response.has_candidates());
        assert_eq!(response.first_text(), "");
    }

    #[test]
    fn odd_shapes_read_as_no_candidates() {
        for body in [
            serde_json::json!(null),
            serde_json::json!([1, 2]),
            serde_json::json!({"candidates": "nope"}),
            serde_json::json!({"candidates": null}),
        ] {
            assert!(!GenerateContentResponse::from_json(&body).has_candidates(), "{body}");
        }
    }

    #[test]
    fn malformed_candidate_content_reads_as_empty() {
        let response = GenerateContentResponse::from_json(&serde_json::json!({
            "candidates": [{"content": {"parts": "text"}}],
            "promptFeedback": "blocked"
        }));
        assert!(response.has_candidates());
        assert_eq!(response.first_text(), "");
        assert_eq!(response.block_reason(), None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [], "usageMetadata": {"promptTokenCount": 10}, "modelVersion": "x"}"#,
        )
        .unwrap();
        assert!(!response.has_candidates());
    }
}
