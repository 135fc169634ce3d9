use crate::models::PatientProfile;

/// Wound categories the classifier must choose from, with the visual cue
/// that identifies each.
pub const WOUND_TAXONOMY: &[(&str, &str)] = &[
    ("Minor Cut/Laceration", "clean skin break, low bleeding"),
    ("Deep Laceration", "wide/deep cut needing stitches"),
    ("Abrasion/Scrape", "skin scraped off, raw surface"),
    ("Burn (Minor/Moderate/Severe)", "redness, blistering, or charring"),
    ("Infected Wound", "pus, redness spreading, warmth, odour signs"),
    ("Bruise/Contusion", "discolouration without skin break"),
    ("Diabetic Ulcer", "chronic open wound, feet area"),
    ("Pressure Ulcer/Bedsore", "fixed pressure point wound"),
    ("Puncture Wound", "small deep hole"),
    ("Cellulitis", "diffuse skin redness/swelling"),
];

const OUTPUT_SCHEMA: &str = r#"{
  "woundType": "specific wound classification based on the image",
  "severity": integer_0_to_100,
  "severityLabel": "Mild or Mild-Moderate or Moderate or Severe",
  "recoveryMin": integer_days,
  "recoveryMax": integer_days,
  "hospitalRecommended": true_or_false,
  "urgency": "low or moderate or high or critical",
  "aiSummary": "2-3 sentence clinical summary describing exactly what you see in the image and the key clinical concerns",
  "precautions": [
    {"title": "group name", "items": ["instruction 1", "instruction 2", "instruction 3"]}
  ],
  "riskFactors": [
    {"label": "factor name", "impact": "low or moderate or high", "description": "1-2 sentence explanation"}
  ]
}"#;

const SCORING_RULES: &str = "\
Severity thresholds: 1-30=Mild, 31-50=Mild-Moderate, 51-70=Moderate, 71-100=Severe
Adjust severity upward if patient has diabetes (+15%), high BP (+10%), or age>60 (+15%).
hospitalRecommended = true if severity>60 or urgency is high/critical.
Include 2-4 precaution groups and 3-5 risk factors.";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Build the instruction sent alongside the wound image.
///
/// Pure and deterministic: the same profile always yields the same text.
pub fn build_assessment_prompt(profile: &PatientProfile) -> String {
    let taxonomy = WOUND_TAXONOMY
        .iter()
        .map(|(name, cue)| format!("- {name}: {cue}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a clinical wound assessment AI. Carefully examine the wound in the image. Based on what you see AND the patient health data below, return a JSON assessment.

Patient Data:
- Age: {age}
- High Blood Pressure: {bp}
- Diabetes: {diabetes}
- Medications: {medications}

IMPORTANT: Base your wound classification entirely on what is VISUALLY visible in the image. Different images must produce different results. The wound in the image determines woundType, severity, and recommendations.

Return ONLY a single valid JSON object (no markdown fences, no explanation text). Use this exact structure:
{OUTPUT_SCHEMA}

Wound classification guidance (match to what you see):
{taxonomy}

{SCORING_RULES}"#,
        age = profile.age,
        bp = yes_no(profile.has_high_bp),
        diabetes = yes_no(profile.has_diabetes),
        medications = profile.medications_listed().unwrap_or("None"),
    )
}
