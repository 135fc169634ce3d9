pub mod assessment; // Wound image triage: classify, validate, fall back
