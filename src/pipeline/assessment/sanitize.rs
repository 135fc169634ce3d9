// Field-by-field validation of the classifier's JSON answer.
// Total over all inputs: every invalid field is replaced by a named default
// instead of rejecting the whole answer. Defaults are logged, never surfaced
// as errors.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::models::{AssessmentResult, Impact, PrecautionGroup, RiskFactor, Urgency};

pub const DEFAULT_WOUND_TYPE: &str = "Undetermined Wound";
pub const DEFAULT_SEVERITY: u8 = 50;
pub const DEFAULT_SEVERITY_LABEL: &str = "Moderate";
pub const DEFAULT_RECOVERY_MIN: u32 = 7;
pub const DEFAULT_RECOVERY_MAX: u32 = 14;
pub const DEFAULT_URGENCY: Urgency = Urgency::Moderate;

/// Impact assigned to a risk factor whose impact is missing or out of set.
pub const DEFAULT_IMPACT: Impact = Impact::Moderate;

/// What the sanitizer had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Top-level fields replaced by their default.
    pub defaulted_fields: Vec<&'static str>,
    /// Precaution groups dropped for lacking a title or item list.
    pub dropped_precautions: usize,
    /// Risk factors dropped for lacking a label.
    pub dropped_risk_factors: usize,
    /// Risk factors kept but with `impact` replaced by the default.
    pub defaulted_impacts: usize,
    /// `recoveryMax` was below `recoveryMin` and the two were swapped.
    pub swapped_recovery: bool,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct SanitizedAssessment {
    pub result: AssessmentResult,
    pub report: SanitizeReport,
}

/// Validate an untrusted classifier answer into a well-formed result.
pub fn sanitize_response(raw: &Value) -> AssessmentResult {
    sanitize_with_report(raw).result
}

/// Same as `sanitize_response`, also returning what was repaired.
///
/// A non-object input is treated as an object with no fields.
pub fn sanitize_with_report(raw: &Value) -> SanitizedAssessment {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let mut report = SanitizeReport::default();

    let wound_type = match obj.get("woundType") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => {
            report.defaulted_fields.push("woundType");
            DEFAULT_WOUND_TYPE.to_string()
        }
    };

    let severity = match finite_number(obj.get("severity")) {
        Some(n) if (0.0..=100.0).contains(&n) => n.round() as u8,
        _ => {
            report.defaulted_fields.push("severity");
            DEFAULT_SEVERITY
        }
    };

    let severity_label = match obj.get("severityLabel") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            report.defaulted_fields.push("severityLabel");
            DEFAULT_SEVERITY_LABEL.to_string()
        }
    };

    let mut recovery_min = recovery_days(obj.get("recoveryMin")).unwrap_or_else(|| {
        report.defaulted_fields.push("recoveryMin");
        DEFAULT_RECOVERY_MIN
    });
    let mut recovery_max = recovery_days(obj.get("recoveryMax")).unwrap_or_else(|| {
        report.defaulted_fields.push("recoveryMax");
        DEFAULT_RECOVERY_MAX
    });
    if recovery_max < recovery_min {
        std::mem::swap(&mut recovery_min, &mut recovery_max);
        report.swapped_recovery = true;
    }

    let hospital_recommended = coerce_bool(obj.get("hospitalRecommended"));

    let urgency = match obj
        .get("urgency")
        .and_then(Value::as_str)
        .and_then(|s| Urgency::from_str(&s.trim().to_lowercase()).ok())
    {
        Some(urgency) => urgency,
        None => {
            report.defaulted_fields.push("urgency");
            DEFAULT_URGENCY
        }
    };

    let ai_summary = match obj.get("aiSummary") {
        Some(Value::String(s)) => s.clone(),
        _ => {
            report.defaulted_fields.push("aiSummary");
            String::new()
        }
    };

    let precautions = match obj.get("precautions") {
        Some(Value::Array(items)) => {
            let groups: Vec<PrecautionGroup> =
                items.iter().filter_map(parse_precaution_group).collect();
            report.dropped_precautions = items.len() - groups.len();
            groups
        }
        _ => {
            report.defaulted_fields.push("precautions");
            Vec::new()
        }
    };

    let risk_factors = match obj.get("riskFactors") {
        Some(Value::Array(items)) => {
            let mut factors = Vec::with_capacity(items.len());
            for item in items {
                match parse_risk_factor(item) {
                    Some((factor, impact_valid)) => {
                        if !impact_valid {
                            report.defaulted_impacts += 1;
                        }
                        factors.push(factor);
                    }
                    None => report.dropped_risk_factors += 1,
                }
            }
            factors
        }
        _ => {
            report.defaulted_fields.push("riskFactors");
            Vec::new()
        }
    };

    if !report.is_clean() {
        tracing::warn!(
            defaulted = ?report.defaulted_fields,
            dropped_precautions = report.dropped_precautions,
            dropped_risk_factors = report.dropped_risk_factors,
            defaulted_impacts = report.defaulted_impacts,
            swapped_recovery = report.swapped_recovery,
            "Classifier response repaired during validation"
        );
    }

    SanitizedAssessment {
        result: AssessmentResult {
            wound_type,
            severity,
            severity_label,
            recovery_min,
            recovery_max,
            hospital_recommended,
            urgency,
            ai_summary,
            precautions,
            risk_factors,
            used_fallback: false,
        },
        report,
    }
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|n| n.is_finite())
}

/// Positive day count, rounded; values that round to zero become one day.
fn recovery_days(value: Option<&Value>) -> Option<u32> {
    finite_number(value)
        .filter(|n| *n > 0.0)
        .map(|n| (n.round() as u32).max(1))
}

/// Truthiness coercion for the hospital flag.
///
/// Absent, null, zero, blank and explicit negatives ("false", "no", "0") are
/// false. Any other present value counts as a recommendation.
fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "no" | "0"
        ),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// A group needs a string title and an item list; non-string items are dropped.
fn parse_precaution_group(value: &Value) -> Option<PrecautionGroup> {
    let obj = value.as_object()?;
    let title = obj.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let items = obj
        .get("items")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    Some(PrecautionGroup {
        title: title.to_string(),
        items,
    })
}

/// A factor needs a non-empty string label. Returns whether `impact` was valid.
fn parse_risk_factor(value: &Value) -> Option<(RiskFactor, bool)> {
    let obj = value.as_object()?;
    let label = obj.get("label")?.as_str()?.trim();
    if label.is_empty() {
        return None;
    }
    let impact = obj
        .get("impact")
        .and_then(Value::as_str)
        .and_then(|s| Impact::from_str(&s.trim().to_lowercase()).ok());
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some((
        RiskFactor {
            label: label.to_string(),
            impact: impact.unwrap_or(DEFAULT_IMPACT),
            description,
        },
        impact.is_some(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well_formed() -> Value {
        json!({
            "woundType": "Moderate Burn",
            "severity": 64,
            "severityLabel": "Moderate",
            "recoveryMin": 10,
            "recoveryMax": 18,
            "hospitalRecommended": true,
            "urgency": "high",
            "aiSummary": "Second-degree burn with blistering on the forearm.",
            "precautions": [
                {"title": "Immediate Care", "items": ["Cool under running water", "Cover loosely"]}
            ],
            "riskFactors": [
                {"label": "Age", "impact": "low", "description": "Young adult."}
            ]
        })
    }

    #[test]
    fn well_formed_response_passes_through() {
        let SanitizedAssessment { result, report } = sanitize_with_report(&well_formed());
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(result.wound_type, "Moderate Burn");
        assert_eq!(result.severity, 64);
        assert_eq!(result.severity_label, "Moderate");
        assert_eq!((result.recovery_min, result.recovery_max), (10, 18));
        assert!(result.hospital_recommended);
        assert_eq!(result.urgency, Urgency::High);
        assert_eq!(result.precautions[0].items.len(), 2);
        assert_eq!(result.risk_factors[0].impact, Impact::Low);
        assert!(!result.used_fallback);
    }

    #[test]
    fn malformed_severity_and_urgency_default() {
        let mut raw = well_formed();
        raw["severity"] = json!("very bad");
        raw["urgency"] = json!("extreme");
        let result = sanitize_response(&raw);
        assert_eq!(result.severity, 50);
        assert_eq!(result.urgency, Urgency::Moderate);
    }

    #[test]
    fn empty_object_gets_every_default() {
        let SanitizedAssessment { result, report } = sanitize_with_report(&json!({}));
        assert_eq!(result.wound_type, DEFAULT_WOUND_TYPE);
        assert_eq!(result.severity, DEFAULT_SEVERITY);
        assert_eq!(result.severity_label, DEFAULT_SEVERITY_LABEL);
        assert_eq!(result.recovery_min, DEFAULT_RECOVERY_MIN);
        assert_eq!(result.recovery_max, DEFAULT_RECOVERY_MAX);
        assert!(!result.hospital_recommended);
        assert_eq!(result.urgency, DEFAULT_URGENCY);
        assert_eq!(result.ai_summary, "");
        assert!(result.precautions.is_empty());
        assert!(result.risk_factors.is_empty());
        assert!(!result.used_fallback);
        assert_eq!(report.defaulted_fields.len(), 9);
    }

    #[test]
    fn non_object_input_is_total() {
        for raw in [json!(null), json!([1, 2]), json!("text"), json!(3.5)] {
            let result = sanitize_response(&raw);
            assert_eq!(result.wound_type, DEFAULT_WOUND_TYPE);
            assert_eq!(result.severity, DEFAULT_SEVERITY);
        }
    }

    #[test]
    fn blank_wound_type_defaults() {
        let mut raw = well_formed();
        raw["woundType"] = json!("   ");
        assert_eq!(sanitize_response(&raw).wound_type, DEFAULT_WOUND_TYPE);
    }

    #[test]
    fn severity_out_of_range_defaults() {
        for bad in [json!(-1), json!(101), json!(250.0), json!(null), json!(true)] {
            let mut raw = well_formed();
            raw["severity"] = bad;
            assert_eq!(sanitize_response(&raw).severity, DEFAULT_SEVERITY);
        }
    }

    #[test]
    fn fractional_severity_rounds() {
        let mut raw = well_formed();
        raw["severity"] = json!(72.6);
        assert_eq!(sanitize_response(&raw).severity, 73);
        raw["severity"] = json!(0);
        assert_eq!(sanitize_response(&raw).severity, 0);
        raw["severity"] = json!(100);
        assert_eq!(sanitize_response(&raw).severity, 100);
    }

    #[test]
    fn non_positive_recovery_defaults() {
        let mut raw = well_formed();
        raw["recoveryMin"] = json!(0);
        raw["recoveryMax"] = json!(-3);
        let result = sanitize_response(&raw);
        assert_eq!(result.recovery_min, DEFAULT_RECOVERY_MIN);
        assert_eq!(result.recovery_max, DEFAULT_RECOVERY_MAX);
    }

    #[test]
    fn tiny_recovery_rounds_up_to_one_day() {
        let mut raw = well_formed();
        raw["recoveryMin"] = json!(0.2);
        assert_eq!(sanitize_response(&raw).recovery_min, 1);
    }

    #[test]
    fn inverted_recovery_range_is_swapped() {
        let mut raw = well_formed();
        raw["recoveryMin"] = json!(21);
        raw["recoveryMax"] = json!(7);
        let SanitizedAssessment { result, report } = sanitize_with_report(&raw);
        assert_eq!((result.recovery_min, result.recovery_max), (7, 21));
        assert!(report.swapped_recovery);
    }

    #[test]
    fn defaulted_min_above_model_max_keeps_invariant() {
        let mut raw = well_formed();
        raw["recoveryMin"] = json!("soon");
        raw["recoveryMax"] = json!(3);
        let result = sanitize_response(&raw);
        assert!(result.recovery_max >= result.recovery_min);
        assert!(result.recovery_min > 0);
    }

    #[test]
    fn hospital_flag_coercion() {
        let cases = [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("true"), true),
            (json!("Yes"), true),
            (json!("false"), false),
            (json!(" NO "), false),
            (json!("0"), false),
            (json!(""), false),
            (json!("maybe"), true),
            (json!(null), false),
            (json!({}), true),
            (json!([]), true),
        ];
        for (value, expected) in cases {
            let mut raw = well_formed();
            raw["hospitalRecommended"] = value.clone();
            assert_eq!(
                sanitize_response(&raw).hospital_recommended,
                expected,
                "value {value}"
            );
        }
        let mut raw = well_formed();
        raw.as_object_mut().unwrap().remove("hospitalRecommended");
        assert!(!sanitize_response(&raw).hospital_recommended);
    }

    #[test]
    fn urgency_case_insensitive() {
        let mut raw = well_formed();
        raw["urgency"] = json!(" Critical ");
        assert_eq!(sanitize_response(&raw).urgency, Urgency::Critical);
    }

    #[test]
    fn non_array_sequences_default_to_empty() {
        let mut raw = well_formed();
        raw["precautions"] = json!("keep it clean");
        raw["riskFactors"] = json!({"label": "Age"});
        let SanitizedAssessment { result, report } = sanitize_with_report(&raw);
        assert!(result.precautions.is_empty());
        assert!(result.risk_factors.is_empty());
        assert!(report.defaulted_fields.contains(&"precautions"));
        assert!(report.defaulted_fields.contains(&"riskFactors"));
    }

    #[test]
    fn malformed_precaution_groups_are_dropped() {
        let mut raw = well_formed();
        raw["precautions"] = json!([
            {"title": "Keep", "items": ["Wash hands", 42, "", "Dress daily"]},
            {"title": 7, "items": ["x"]},
            {"title": "No items"},
            "just a string"
        ]);
        let SanitizedAssessment { result, report } = sanitize_with_report(&raw);
        assert_eq!(result.precautions.len(), 1);
        assert_eq!(result.precautions[0].items, vec!["Wash hands", "Dress daily"]);
        assert_eq!(report.dropped_precautions, 3);
    }

    #[test]
    fn invalid_impact_is_replaced_not_propagated() {
        let mut raw = well_formed();
        raw["riskFactors"] = json!([
            {"label": "Smoking", "impact": "severe", "description": "Impairs healing."},
            {"label": "Diabetes", "impact": "HIGH"},
            {"label": "", "impact": "low"},
            {"impact": "low", "description": "no label"}
        ]);
        let SanitizedAssessment { result, report } = sanitize_with_report(&raw);
        assert_eq!(result.risk_factors.len(), 2);
        assert_eq!(result.risk_factors[0].impact, DEFAULT_IMPACT);
        assert_eq!(result.risk_factors[1].impact, Impact::High);
        assert_eq!(result.risk_factors[1].description, "");
        assert_eq!(report.defaulted_impacts, 1);
        assert_eq!(report.dropped_risk_factors, 2);
    }

    #[test]
    fn precaution_order_is_preserved() {
        let mut raw = well_formed();
        raw["precautions"] = json!([
            {"title": "B", "items": ["3", "1", "2"]},
            {"title": "A", "items": []}
        ]);
        let result = sanitize_response(&raw);
        assert_eq!(result.precautions[0].title, "B");
        assert_eq!(result.precautions[0].items, vec!["3", "1", "2"]);
        assert_eq!(result.precautions[1].title, "A");
    }
}
