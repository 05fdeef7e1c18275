//! Prediction orchestrator: the pipeline entry point.
//!
//! forms → model input → external service → [fallback scorer] → store.

use uuid::Uuid;

use crate::models::{FormType, Prediction, PredictionDraft};

use super::client::PredictionClient;
use super::scorer;
use super::store::{FormStore, PredictionStore};
use super::types::{ModelInput, PredictionOutcome};
use super::PredictionError;

/// Runs one risk assessment per call. Holds no state between calls.
pub struct PredictionOrchestrator<'a> {
    forms: &'a dyn FormStore,
    client: &'a dyn PredictionClient,
    predictions: &'a dyn PredictionStore,
}

impl<'a> PredictionOrchestrator<'a> {
    pub fn new(
        forms: &'a dyn FormStore,
        client: &'a dyn PredictionClient,
        predictions: &'a dyn PredictionStore,
    ) -> Self {
        Self {
            forms,
            client,
            predictions,
        }
    }

    /// Assess the patient and append a new prediction row.
    ///
    /// Fails with `MissingRequiredForms` before any external call or write
    /// when either the biometrics or the lifestyle form is absent.
    pub fn create_prediction(&self, patient_id: &Uuid) -> Result<Prediction, PredictionError> {
        let input = self.load_model_input(patient_id)?;
        let outcome = self.assess(&input);

        tracing::info!(
            patient_id = %patient_id,
            source = outcome.source().as_str(),
            "Risk assessment produced"
        );

        let assessment = outcome.into_assessment().clamped();
        let prediction = self.predictions.insert(PredictionDraft {
            patient_id: *patient_id,
            risk_type: assessment.risk_type,
            score: assessment.score,
            explanation: assessment.explanation,
        })?;

        Ok(prediction)
    }

    /// Merge the latest biometrics and lifestyle forms.
    pub fn load_model_input(&self, patient_id: &Uuid) -> Result<ModelInput, PredictionError> {
        let biometrics = self.forms.latest(patient_id, FormType::Biometrics)?;
        let lifestyle = self.forms.latest(patient_id, FormType::Lifestyle)?;

        match (biometrics, lifestyle) {
            (Some(bio), Some(life)) => Ok(ModelInput::merge(*patient_id, &bio, &life)),
            (bio, life) => {
                let mut missing = Vec::new();
                if bio.is_none() {
                    missing.push(FormType::Biometrics);
                }
                if life.is_none() {
                    missing.push(FormType::Lifestyle);
                }
                tracing::debug!(patient_id = %patient_id, ?missing, "Prediction prerequisites missing");
                Err(PredictionError::MissingRequiredForms { missing })
            }
        }
    }

    /// External service first, rule-based scorer when it is unavailable.
    pub fn assess(&self, input: &ModelInput) -> PredictionOutcome {
        match self.client.predict(input) {
            Ok(assessment) => PredictionOutcome::External(assessment),
            Err(reason) => {
                tracing::warn!(
                    patient_id = %input.patient_id,
                    %reason,
                    "Prediction service unavailable, using rule-based scorer"
                );
                PredictionOutcome::Fallback {
                    assessment: scorer::score(input),
                    reason,
                }
            }
        }
    }
}
