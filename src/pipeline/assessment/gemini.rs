use std::sync::Mutex;
use std::time::Duration;

use super::gemini_types::{
    Candidate, GenerateContentRequest, GenerateContentResponse, ResponseContent, ResponsePart,
};
use super::parser::parse_envelope;
use super::AssessmentError;
use crate::config::EngineConfig;

/// Longest error body kept from a non-success response.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Multimodal classification service abstraction (allows mocking).
pub trait ClassificationClient: Send + Sync {
    /// Submit one request. Exactly one network attempt, no retry.
    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AssessmentError>;
}

/// Blocking HTTP client for the hosted `generateContent` endpoint.
pub struct GeminiClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(config: &EngineConfig) -> Result<Self, AssessmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssessmentError::Network(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            endpoint: config.generate_content_url(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ClassificationClient for GeminiClient {
    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AssessmentError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AssessmentError::MissingCredential)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AssessmentError::Network(format!("cannot reach {}", self.endpoint))
                } else if e.is_timeout() {
                    AssessmentError::Network(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    AssessmentError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AssessmentError::HttpStatus {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let body = response
            .text()
            .map_err(|e| AssessmentError::InvalidEnvelope(e.to_string()))?;
        tracing::debug!(status = status.as_u16(), body_len = body.len(), "Classification response received");
        parse_envelope(&body)
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

/// Mock classification client for testing. Returns a fixed outcome and
/// records every request it receives.
pub struct MockClassificationClient {
    outcome: Result<GenerateContentResponse, AssessmentError>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockClassificationClient {
    /// Answer with a single candidate whose first part is `text`.
    pub fn with_text(text: &str) -> Self {
        Self::with_envelope(GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ResponseContent {
                    parts: Some(vec![ResponsePart {
                        text: Some(text.to_string()),
                    }]),
                }),
                finish_reason: Some("STOP".to_string()),
            }]),
            prompt_feedback: None,
        })
    }

    pub fn with_envelope(response: GenerateContentResponse) -> Self {
        Self {
            outcome: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: AssessmentError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn last_request(&self) -> Option<GenerateContentRequest> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

impl ClassificationClient for MockClassificationClient {
    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AssessmentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.outcome.clone()
    }
}
