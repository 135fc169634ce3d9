use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::gemini_types::GenerateContentResponse;
use super::AssessmentError;

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z0-9_+-]*\s*").unwrap());
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```\s*$").unwrap());

/// Parse the raw HTTP body into the response envelope.
///
/// Only a body that is not JSON at all is an invalid envelope. Valid JSON of
/// an unexpected shape is read leniently and judged by candidate extraction.
pub fn parse_envelope(body: &str) -> Result<GenerateContentResponse, AssessmentError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| AssessmentError::InvalidEnvelope(e.to_string()))?;
    Ok(GenerateContentResponse::from_json(&value))
}

/// Pull the classifier's answer text out of the envelope.
///
/// Only the first candidate's first text part is consumed.
pub fn extract_candidate_text(
    response: &GenerateContentResponse,
) -> Result<&str, AssessmentError> {
    if !response.has_candidates() {
        return Err(AssessmentError::NoCandidates {
            block_reason: response.block_reason().map(str::to_string),
        });
    }

    let text = response.first_text();
    if text.trim().is_empty() {
        return Err(AssessmentError::EmptyContent);
    }
    Ok(text)
}

/// Remove a markdown code fence wrapped around the answer, if any.
///
/// Best effort: handles a leading fence with an optional language tag and a
/// trailing fence. Anything else is left for the JSON parser to reject.
pub fn strip_code_fences(text: &str) -> &str {
    let start = LEADING_FENCE.find(text).map_or(0, |m| m.end());
    let rest = &text[start..];
    let end = TRAILING_FENCE.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim()
}

/// Parse candidate text into the raw (unvalidated) assessment object.
///
/// The returned value is always a JSON object.
pub fn parse_assessment_json(text: &str) -> Result<Value, AssessmentError> {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(other) => Err(AssessmentError::NonJsonContent(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(AssessmentError::NonJsonContent(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSESSMENT: &str = r#"{"woundType": "Abrasion", "severity": 28, "urgency": "low"}"#;

    #[test]
    fn unfenced_text_is_unchanged() {
        assert_eq!(strip_code_fences(ASSESSMENT), ASSESSMENT);
    }

    #[test]
    fn json_fence_is_stripped() {
        let fenced = format!("```json\n{ASSESSMENT}\n```");
        assert_eq!(strip_code_fences(&fenced), ASSESSMENT);
    }

    #[test]
    fn bare_and_uppercase_fences_are_stripped() {
        assert_eq!(strip_code_fences(&format!("```\n{ASSESSMENT}\n```")), ASSESSMENT);
        assert_eq!(strip_code_fences(&format!("```JSON {ASSESSMENT}```")), ASSESSMENT);
        assert_eq!(
            strip_code_fences(&format!("  \n```json\r\n{ASSESSMENT}\r\n```  \n")),
            ASSESSMENT
        );
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = parse_assessment_json(ASSESSMENT).unwrap();
        let fenced = parse_assessment_json(&format!("```json\n{ASSESSMENT}\n```")).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain["woundType"], "Abrasion");
    }

    #[test]
    fn prose_is_non_json() {
        let result = parse_assessment_json("I cannot assess this image, sorry.");
        assert!(matches!(result, Err(AssessmentError::NonJsonContent(_))));
    }

    #[test]
    fn non_object_json_is_rejected() {
        let result = parse_assessment_json("[1, 2, 3]");
        match result {
            Err(AssessmentError::NonJsonContent(msg)) => assert!(msg.contains("array")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn envelope_must_be_json() {
        let result = parse_envelope("<html>Bad Gateway</html>");
        assert!(matches!(result, Err(AssessmentError::InvalidEnvelope(_))));
    }

    fn reason_for(body: &str) -> String {
        match parse_envelope(body).and_then(|e| extract_candidate_text(&e).map(str::to_string)) {
            Ok(text) => format!("ok: {text}"),
            Err(e) => e.fallback_reason(),
        }
    }

    #[test]
    fn null_body_is_no_response() {
        assert_eq!(reason_for("null"), "no response from AI (possible safety filter)");
    }

    #[test]
    fn null_candidate_is_empty_response() {
        assert_eq!(reason_for(r#"{"candidates": [null]}"#), "empty AI response");
    }

    #[test]
    fn valid_json_of_wrong_shape_is_not_invalid_envelope() {
        assert_eq!(
            reason_for(r#"{"candidates": "nope"}"#),
            "no response from AI (possible safety filter)"
        );
        assert_eq!(reason_for("{}"), "no response from AI (possible safety filter)");
        assert_eq!(reason_for("[]"), "no response from AI (possible safety filter)");
        assert_eq!(
            reason_for(r#"{"candidates": [{"content": 5}]}"#),
            "empty AI response"
        );
        assert_eq!(reason_for("not json"), "invalid API response");
    }

    #[test]
    fn missing_candidates_reports_block_reason() {
        let envelope = parse_envelope(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        match extract_candidate_text(&envelope) {
            Err(AssessmentError::NoCandidates { block_reason }) => {
                assert_eq!(block_reason.as_deref(), Some("SAFETY"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_candidate_list_is_no_candidates() {
        let envelope = parse_envelope(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_candidate_text(&envelope),
            Err(AssessmentError::NoCandidates { .. })
        ));
    }

    #[test]
    fn blank_text_is_empty_content() {
        let envelope =
            parse_envelope(r#"{"candidates": [{"content": {"parts": [{"text": "  \n"}]}}]}"#)
                .unwrap();
        assert_eq!(
            extract_candidate_text(&envelope),
            Err(AssessmentError::EmptyContent)
        );
    }

    #[test]
    fn candidate_text_extracted() {
        let envelope = parse_envelope(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"severity\": 10}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_candidate_text(&envelope).unwrap(), r#"{"severity": 10}"#);
    }
}
