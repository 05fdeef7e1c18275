//! Store seams for the prediction pipeline.
//!
//! The orchestrator only sees these traits; the SQLite implementations
//! delegate to the repository functions over a borrowed connection.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::sqlite::now_timestamp;
use crate::db::{self, DatabaseError};
use crate::models::{FormType, HistoryWindow, PatientForm, Prediction, PredictionDraft};

/// Read access to patient form submissions.
pub trait FormStore {
    /// Most recent form of `form_type` for the patient.
    fn latest(
        &self,
        patient_id: &Uuid,
        form_type: FormType,
    ) -> Result<Option<PatientForm>, DatabaseError>;

    /// Forms inside `window`, newest first, at most `limit`.
    fn history(
        &self,
        patient_id: &Uuid,
        window: HistoryWindow,
        limit: u32,
    ) -> Result<Vec<PatientForm>, DatabaseError>;
}

/// Append-only prediction history.
pub trait PredictionStore {
    /// Assign id and `created_at`, then insert.
    fn insert(&self, draft: PredictionDraft) -> Result<Prediction, DatabaseError>;

    fn list_by_patient(&self, patient_id: &Uuid, limit: u32) -> Result<Vec<Prediction>, DatabaseError>;

    fn latest_by_patient(&self, patient_id: &Uuid) -> Result<Option<Prediction>, DatabaseError>;
}

pub struct SqliteFormStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteFormStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl FormStore for SqliteFormStore<'_> {
    fn latest(
        &self,
        patient_id: &Uuid,
        form_type: FormType,
    ) -> Result<Option<PatientForm>, DatabaseError> {
        db::get_latest_form(self.conn, patient_id, form_type)
    }

    fn history(
        &self,
        patient_id: &Uuid,
        window: HistoryWindow,
        limit: u32,
    ) -> Result<Vec<PatientForm>, DatabaseError> {
        let since = window.since(now_timestamp());
        db::get_form_history(self.conn, patient_id, since.as_ref(), limit)
    }
}

pub struct SqlitePredictionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqlitePredictionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl PredictionStore for SqlitePredictionStore<'_> {
    fn insert(&self, draft: PredictionDraft) -> Result<Prediction, DatabaseError> {
        let prediction = draft.into_prediction(Uuid::new_v4(), now_timestamp());
        db::insert_prediction(self.conn, &prediction)?;
        Ok(prediction)
    }

    fn list_by_patient(&self, patient_id: &Uuid, limit: u32) -> Result<Vec<Prediction>, DatabaseError> {
        db::get_predictions_for_patient(self.conn, patient_id, limit)
    }

    fn latest_by_patient(&self, patient_id: &Uuid) -> Result<Option<Prediction>, DatabaseError> {
        db::get_latest_prediction(self.conn, patient_id)
    }
}
