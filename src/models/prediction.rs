use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted risk assessment. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub risk_type: String,
    pub score: f64,
    pub explanation: String,
    pub created_at: NaiveDateTime,
}

/// Prediction fields before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionDraft {
    pub patient_id: Uuid,
    pub risk_type: String,
    pub score: f64,
    pub explanation: String,
}

impl PredictionDraft {
    pub fn into_prediction(self, id: Uuid, created_at: NaiveDateTime) -> Prediction {
        Prediction {
            id,
            patient_id: self.patient_id,
            risk_type: self.risk_type,
            score: self.score,
            explanation: self.explanation,
            created_at,
        }
    }
}
