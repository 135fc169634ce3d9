//! Demonstration scorer.
//!
//! Picks a canned wound archetype and scales it by the patient's risk
//! profile. No image is analysed; results are flagged as estimates.

use rand::seq::SliceRandom;
use rand::Rng;

use super::fallback::{profile_risk_factors, profile_warrants_hospital, severity_label_for, RiskAdjustment};
use crate::models::{AssessmentResult, PatientProfile, PrecautionGroup, Urgency};

/// A canned wound presentation with its unadjusted baseline.
#[derive(Debug, Clone, Copy)]
pub struct WoundArchetype {
    pub wound_type: &'static str,
    pub base_severity: u32,
    pub base_recovery_min: u32,
    pub base_recovery_max: u32,
    pub base_hospital: bool,
    pub base_urgency: Urgency,
    pub precautions: &'static [(&'static str, &'static [&'static str])],
}

impl WoundArchetype {
    pub fn precaution_groups(&self) -> Vec<PrecautionGroup> {
        self.precautions
            .iter()
            .map(|(title, items)| PrecautionGroup::new(title, items))
            .collect()
    }
}

pub const WOUND_ARCHETYPES: &[WoundArchetype] = &[
    WoundArchetype {
        wound_type: "Moderate Burn",
        base_severity: 68,
        base_recovery_min: 12,
        base_recovery_max: 16,
        base_hospital: true,
        base_urgency: Urgency::High,
        precautions: &[
            (
                "Immediate Care",
                &[
                    "Cool the burn under running water for at least 20 minutes",
                    "Do not apply ice directly to the burn",
                    "Remove jewelry or tight clothing near the burn area",
                    "Cover with a sterile, non-adhesive bandage",
                ],
            ),
            (
                "Ongoing Treatment",
                &[
                    "Apply prescribed burn ointment as directed",
                    "Change dressings daily or as instructed",
                    "Keep the area elevated when possible",
                    "Take pain medication as recommended",
                ],
            ),
            (
                "Warning Signs",
                &[
                    "Increased redness, swelling, or pus",
                    "Fever above 100.4°F (38°C)",
                    "Persistent or worsening pain",
                    "Foul smell from the wound",
                ],
            ),
        ],
    },
    WoundArchetype {
        wound_type: "Deep Laceration",
        base_severity: 74,
        base_recovery_min: 10,
        base_recovery_max: 21,
        base_hospital: true,
        base_urgency: Urgency::High,
        precautions: &[
            (
                "Immediate Care",
                &[
                    "Apply firm, direct pressure with a clean cloth",
                    "Do not remove embedded objects",
                    "Keep the wound elevated above heart level",
                    "Seek medical attention for stitches if deeper than 1/4 inch",
                ],
            ),
            (
                "Wound Management",
                &[
                    "Keep stitches or wound closure strips dry for 24-48 hours",
                    "Clean gently with mild soap after 48 hours",
                    "Apply antibiotic ointment as prescribed",
                    "Do not pick at scabs or stitches",
                ],
            ),
            (
                "Warning Signs",
                &[
                    "Excessive bleeding that won't stop",
                    "Numbness or tingling beyond the wound",
                    "Red streaks extending from the wound",
                    "Signs of infection (warmth, swelling, pus)",
                ],
            ),
        ],
    },
    WoundArchetype {
        wound_type: "Minor Cut",
        base_severity: 22,
        base_recovery_min: 3,
        base_recovery_max: 7,
        base_hospital: false,
        base_urgency: Urgency::Low,
        precautions: &[
            (
                "Home Care",
                &[
                    "Wash hands before treating the wound",
                    "Clean the cut with clean water",
                    "Apply gentle pressure to stop bleeding",
                    "Apply an adhesive bandage or sterile gauze",
                ],
            ),
            (
                "Healing Tips",
                &[
                    "Change the bandage daily",
                    "Keep the wound clean and dry",
                    "Apply over-the-counter antibiotic ointment",
                    "Avoid picking at the scab",
                ],
            ),
        ],
    },
    WoundArchetype {
        wound_type: "Infected Wound",
        base_severity: 78,
        base_recovery_min: 14,
        base_recovery_max: 28,
        base_hospital: true,
        base_urgency: Urgency::Critical,
        precautions: &[
            (
                "Urgent Steps",
                &[
                    "Seek medical attention immediately",
                    "Do not attempt to drain the infection yourself",
                    "Keep the area clean and covered",
                    "Complete the full course of prescribed antibiotics",
                ],
            ),
            (
                "Monitoring",
                &[
                    "Track the size of redness with a marker",
                    "Monitor body temperature regularly",
                    "Watch for spreading redness or red streaks",
                    "Note any increase in discharge or odor",
                ],
            ),
            (
                "Prevention",
                &[
                    "Always clean wounds promptly",
                    "Use sterile bandages and change regularly",
                    "Keep tetanus vaccination up to date",
                    "Maintain good hand hygiene",
                ],
            ),
        ],
    },
    WoundArchetype {
        wound_type: "Abrasion",
        base_severity: 30,
        base_recovery_min: 5,
        base_recovery_max: 10,
        base_hospital: false,
        base_urgency: Urgency::Low,
        precautions: &[
            (
                "Cleaning",
                &[
                    "Rinse thoroughly with clean water",
                    "Gently remove debris with tweezers if needed",
                    "Pat dry with a clean cloth",
                    "Apply antiseptic solution",
                ],
            ),
            (
                "Protection",
                &[
                    "Cover with a non-stick sterile bandage",
                    "Apply petroleum jelly to keep moist",
                    "Change dressing daily or when soiled",
                    "Avoid exposing to dirt or contaminants",
                ],
            ),
        ],
    },
    WoundArchetype {
        wound_type: "Diabetic Ulcer",
        base_severity: 82,
        base_recovery_min: 30,
        base_recovery_max: 60,
        base_hospital: true,
        base_urgency: Urgency::Critical,
        precautions: &[
            (
                "Medical Care",
                &[
                    "Consult a wound care specialist immediately",
                    "Offload pressure from the affected area",
                    "Maintain strict blood sugar control",
                    "Follow prescribed wound care regimen exactly",
                ],
            ),
            (
                "Daily Management",
                &[
                    "Inspect feet daily for changes",
                    "Keep the ulcer clean and properly dressed",
                    "Never walk barefoot",
                    "Wear properly fitted diabetic footwear",
                ],
            ),
            (
                "Lifestyle",
                &[
                    "Monitor blood glucose levels frequently",
                    "Maintain a balanced diet",
                    "Avoid smoking as it impairs healing",
                    "Keep follow-up appointments",
                ],
            ),
        ],
    },
];

pub fn find_archetype(wound_type: &str) -> Option<&'static WoundArchetype> {
    WOUND_ARCHETYPES
        .iter()
        .find(|a| a.wound_type.eq_ignore_ascii_case(wound_type.trim()))
}

fn demo_summary(archetype: &WoundArchetype) -> String {
    format!(
        "Demonstration result: no image analysis was performed. A sample {} presentation \
         was scaled to your health profile for illustration only.",
        archetype.wound_type.to_lowercase()
    )
}

/// Score a demonstration assessment with a randomly chosen archetype.
pub fn run_demo_assessment<R: Rng + ?Sized>(
    profile: &PatientProfile,
    rng: &mut R,
) -> AssessmentResult {
    let archetype = WOUND_ARCHETYPES
        .choose(rng)
        .unwrap_or(&WOUND_ARCHETYPES[0]);
    demo_with_archetype(profile, archetype)
}

/// Score a demonstration assessment for a fixed archetype.
pub fn demo_with_archetype(profile: &PatientProfile, archetype: &WoundArchetype) -> AssessmentResult {
    let adjustment = RiskAdjustment::for_profile(profile);
    let severity = adjustment.scale_severity(archetype.base_severity);
    let recovery_min = adjustment.scale_days(archetype.base_recovery_min);
    let recovery_max = adjustment.scale_days(archetype.base_recovery_max).max(recovery_min);

    tracing::info!(
        archetype = archetype.wound_type,
        severity,
        "Demonstration assessment scored"
    );

    AssessmentResult {
        wound_type: archetype.wound_type.to_string(),
        severity,
        severity_label: severity_label_for(severity).to_string(),
        recovery_min,
        recovery_max,
        hospital_recommended: archetype.base_hospital
            || profile_warrants_hospital(profile, severity),
        urgency: Urgency::from_severity_or(severity, archetype.base_urgency),
        ai_summary: demo_summary(archetype),
        precautions: archetype.precaution_groups(),
        risk_factors: profile_risk_factors(profile),
        used_fallback: true,
    }
}
