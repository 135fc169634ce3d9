//! Profile-only scoring.
//!
//! Used when image analysis cannot complete, and by the demonstration scorer.
//! Everything here is a pure function of the patient profile.

use crate::models::{AssessmentResult, Impact, PatientProfile, PrecautionGroup, RiskFactor, Urgency};

pub const FALLBACK_WOUND_TYPE: &str = "Wound (Image Analysis Unavailable)";

/// Severity assumed for an unseen wound before profile adjustment.
pub const FALLBACK_BASE_SEVERITY: u32 = 40;
pub const FALLBACK_BASE_RECOVERY_MIN: u32 = 5;
pub const FALLBACK_BASE_RECOVERY_MAX: u32 = 14;

/// Upper bound for any profile-adjusted severity.
pub const MAX_ADJUSTED_SEVERITY: u32 = 98;

// ──────────────────────────────────────────────
// Risk multiplier
// ──────────────────────────────────────────────

/// Additive profile factors behind the risk multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAdjustment {
    pub age_factor: f64,
    pub diabetes_factor: f64,
    pub bp_factor: f64,
}

impl RiskAdjustment {
    pub fn for_profile(profile: &PatientProfile) -> Self {
        let age_factor = if profile.age > 60 {
            0.25
        } else if profile.age > 45 {
            0.1
        } else {
            0.0
        };
        Self {
            age_factor,
            diabetes_factor: if profile.has_diabetes { 0.3 } else { 0.0 },
            bp_factor: if profile.has_high_bp { 0.15 } else { 0.0 },
        }
    }

    /// `1 + age + diabetes + bp`, summed in that order.
    pub fn multiplier(&self) -> f64 {
        1.0 + self.age_factor + self.diabetes_factor + self.bp_factor
    }

    /// Scale a baseline severity, capped at `MAX_ADJUSTED_SEVERITY`.
    pub fn scale_severity(&self, base: u32) -> u8 {
        let scaled = self.scale(base).min(MAX_ADJUSTED_SEVERITY);
        scaled as u8
    }

    /// Scale a baseline day count. Never below one day.
    pub fn scale_days(&self, base: u32) -> u32 {
        self.scale(base).max(1)
    }

    fn scale(&self, base: u32) -> u32 {
        (f64::from(base) * self.multiplier()).round() as u32
    }
}

pub fn severity_label_for(severity: u8) -> &'static str {
    if severity > 80 {
        "Severe"
    } else if severity > 60 {
        "Moderate"
    } else if severity > 40 {
        "Mild-Moderate"
    } else {
        "Mild"
    }
}

/// Hospital rule shared by the fallback and demonstration scorers.
pub fn profile_warrants_hospital(profile: &PatientProfile, severity: u8) -> bool {
    severity > 60 || (profile.has_diabetes && severity > 40)
}

// ──────────────────────────────────────────────
// Risk factors & precautions
// ──────────────────────────────────────────────

/// Profile-derived risk factors: age tier, blood pressure, diabetes, then
/// medications when any are listed.
pub fn profile_risk_factors(profile: &PatientProfile) -> Vec<RiskFactor> {
    let mut factors = Vec::with_capacity(4);

    factors.push(if profile.age > 60 {
        RiskFactor::new(
            "Age (>60)",
            Impact::High,
            "Advanced age significantly slows wound healing and increases infection risk.",
        )
    } else if profile.age > 45 {
        RiskFactor::new(
            "Age (45-60)",
            Impact::Moderate,
            "Middle age may moderately affect healing speed.",
        )
    } else {
        RiskFactor::new("Age", Impact::Low, "Younger age supports faster wound healing.")
    });

    factors.push(if profile.has_high_bp {
        RiskFactor::new(
            "Blood Pressure",
            Impact::High,
            "High blood pressure impairs circulation and delays wound healing.",
        )
    } else {
        RiskFactor::new(
            "Blood Pressure",
            Impact::Low,
            "Normal blood pressure supports healthy circulation for healing.",
        )
    });

    factors.push(if profile.has_diabetes {
        RiskFactor::new(
            "Diabetes",
            Impact::High,
            "Diabetes significantly increases infection risk and slows tissue repair.",
        )
    } else {
        RiskFactor::new(
            "Diabetes",
            Impact::Low,
            "No diabetes — lower risk of complications.",
        )
    });

    if profile.medications_listed().is_some() {
        factors.push(RiskFactor::new(
            "Medications",
            Impact::Moderate,
            format!(
                "Current medications ({}) may interact with wound healing.",
                profile.medications
            ),
        ));
    }

    factors
}

pub fn general_precautions() -> Vec<PrecautionGroup> {
    vec![
        PrecautionGroup::new(
            "General Wound Care",
            &[
                "Wash hands thoroughly before touching the wound",
                "Clean the wound gently with clean water or saline solution",
                "Apply a sterile dressing and change it daily",
                "Keep the wound area elevated when possible to reduce swelling",
            ],
        ),
        PrecautionGroup::new(
            "Warning Signs — Seek Care Immediately",
            &[
                "Increasing redness, warmth, or swelling around the wound",
                "Pus or unusual discharge from the wound",
                "Fever above 38°C (100.4°F)",
                "Red streaks spreading from the wound area",
            ],
        ),
    ]
}

fn fallback_summary(reason: &str) -> String {
    format!(
        "⚠️ AI image analysis could not complete ({reason}). Results below are estimated \
         from your health profile only. For accurate wound analysis, please ensure a stable \
         internet connection and try again."
    )
}

// ──────────────────────────────────────────────
// Scorer
// ──────────────────────────────────────────────

/// Estimate an assessment from the profile alone.
///
/// `reason` is quoted in the summary so the user knows why the image was not
/// analysed. Deterministic in `(profile, reason)`.
pub fn score_fallback(profile: &PatientProfile, reason: &str) -> AssessmentResult {
    let adjustment = RiskAdjustment::for_profile(profile);
    let severity = adjustment.scale_severity(FALLBACK_BASE_SEVERITY);

    AssessmentResult {
        wound_type: FALLBACK_WOUND_TYPE.to_string(),
        severity,
        severity_label: severity_label_for(severity).to_string(),
        recovery_min: adjustment.scale_days(FALLBACK_BASE_RECOVERY_MIN),
        recovery_max: adjustment.scale_days(FALLBACK_BASE_RECOVERY_MAX),
        hospital_recommended: profile_warrants_hospital(profile, severity),
        urgency: Urgency::from_severity(severity),
        ai_summary: fallback_summary(reason),
        precautions: general_precautions(),
        risk_factors: profile_risk_factors(profile),
        used_fallback: true,
    }
}
