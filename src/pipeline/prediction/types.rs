use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{FormValues, PatientForm};

use super::client::ServiceUnavailable;

// ═══════════════════════════════════════════════════════════
// Model input
// ═══════════════════════════════════════════════════════════

/// Scorer features extracted from merged form values.
///
/// Every field is optional; a missing field skips its rule. Weight is in
/// kilograms and height in centimetres.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskFeatures {
    pub age: Option<f64>,
    pub bmi: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub glucose: Option<f64>,
    pub heart_rate: Option<f64>,
    pub smoking: Option<bool>,
    pub exercise: Option<String>,
    pub exercise_frequency: Option<f64>,
}

impl RiskFeatures {
    /// Read known keys from a form value bag. Unknown keys are ignored.
    pub fn from_values(values: &FormValues) -> Self {
        let num = |key: &str| values.get(key).and_then(numeric);
        Self {
            age: num("age"),
            bmi: num("bmi"),
            weight: num("weight"),
            height: num("height"),
            systolic: num("systolic"),
            diastolic: num("diastolic"),
            glucose: num("glucose"),
            heart_rate: num("heartRate"),
            smoking: values.get("smoking").and_then(truthy_yes),
            exercise: values
                .get("exercise")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            exercise_frequency: num("exerciseFrequency"),
        }
    }

    /// Explicit non-zero BMI, otherwise derived from weight and height.
    pub fn effective_bmi(&self) -> Option<f64> {
        self.bmi
            .filter(|b| *b > 0.0)
            .or_else(|| derive_bmi(self.weight?, self.height?))
    }
}

/// BMI from weight (kg) and height (cm). `None` for non-positive inputs.
pub fn derive_bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let metres = height_cm / 100.0;
    Some(weight_kg / (metres * metres))
}

/// Numbers, or strings holding a number (HTML form inputs arrive as text).
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// `true`/`false`, or "yes" (case-insensitive, trimmed) vs anything else for string answers.
fn truthy_yes(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => Some(s.trim().eq_ignore_ascii_case("yes")),
        _ => None,
    }
}

/// Merged biometrics + lifestyle values for one patient.
///
/// Keeps the full merged bag as the external request body and exposes the
/// typed features the scorer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub patient_id: Uuid,
    pub features: RiskFeatures,
    values: FormValues,
}

impl ModelInput {
    /// Shallow merge: biometrics first, lifestyle second (lifestyle wins on
    /// key collision), then `patient_id`.
    pub fn merge(patient_id: Uuid, biometrics: &PatientForm, lifestyle: &PatientForm) -> Self {
        let mut values = biometrics.values.clone();
        for (key, value) in &lifestyle.values {
            values.insert(key.clone(), value.clone());
        }
        Self::from_values(patient_id, values)
    }

    pub fn from_values(patient_id: Uuid, mut values: FormValues) -> Self {
        values.insert("patient_id".into(), Value::String(patient_id.to_string()));
        let features = RiskFeatures::from_values(&values);
        Self {
            patient_id,
            features,
            values,
        }
    }

    /// JSON body sent to the prediction service.
    pub fn request_body(&self) -> &FormValues {
        &self.values
    }
}

// ═══════════════════════════════════════════════════════════
// Assessment
// ═══════════════════════════════════════════════════════════

/// Unified result shape for both the external and the rule-based path.
/// Also the wire format of the prediction service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_type: String,
    pub score: f64,
    pub explanation: String,
}

impl RiskAssessment {
    /// Clamp the score into `[0, 100]`, rounded to two decimals.
    pub fn clamped(mut self) -> Self {
        self.score = round2(self.score.clamp(0.0, 100.0));
        self
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Which path produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    External,
    RuleBased,
}

impl PredictionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PredictionSource::External => "external",
            PredictionSource::RuleBased => "rule_based",
        }
    }
}

/// Outcome of one assessment attempt.
#[derive(Debug)]
pub enum PredictionOutcome {
    External(RiskAssessment),
    Fallback {
        assessment: RiskAssessment,
        reason: ServiceUnavailable,
    },
}

impl PredictionOutcome {
    pub fn source(&self) -> PredictionSource {
        match self {
            PredictionOutcome::External(_) => PredictionSource::External,
            PredictionOutcome::Fallback { .. } => PredictionSource::RuleBased,
        }
    }

    pub fn into_assessment(self) -> RiskAssessment {
        match self {
            PredictionOutcome::External(assessment) => assessment,
            PredictionOutcome::Fallback { assessment, .. } => assessment,
        }
    }
}
