use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::Prediction;

/// Default number of predictions returned by history queries.
pub const DEFAULT_PREDICTION_LIMIT: u32 = 10;

pub fn insert_prediction(conn: &Connection, prediction: &Prediction) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO predictions (id, patient_id, risk_type, score, explanation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            prediction.id.to_string(),
            prediction.patient_id.to_string(),
            prediction.risk_type,
            prediction.score,
            prediction.explanation,
            format_timestamp(&prediction.created_at),
        ],
    )?;
    Ok(())
}

/// Predictions for a patient ordered by `created_at` descending.
pub fn get_predictions_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
    limit: u32,
) -> Result<Vec<Prediction>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, risk_type, score, explanation, created_at
         FROM predictions
         WHERE patient_id = ?1
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?2",
    )?;
    let rows = stmt.query_map(
        params![patient_id.to_string(), i64::from(limit)],
        read_prediction_row,
    )?;

    let mut predictions = Vec::new();
    for row in rows {
        predictions.push(prediction_from_row(row?)?);
    }
    Ok(predictions)
}

pub fn get_latest_prediction(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<Prediction>, DatabaseError> {
    Ok(get_predictions_for_patient(conn, patient_id, 1)?.into_iter().next())
}

struct PredictionRow {
    id: String,
    patient_id: String,
    risk_type: String,
    score: f64,
    explanation: String,
    created_at: String,
}

fn read_prediction_row(row: &rusqlite::Row) -> Result<PredictionRow, rusqlite::Error> {
    Ok(PredictionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        risk_type: row.get(2)?,
        score: row.get(3)?,
        explanation: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn prediction_from_row(row: PredictionRow) -> Result<Prediction, DatabaseError> {
    Ok(Prediction {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: Uuid::parse_str(&row.patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        risk_type: row.risk_type,
        score: row.score,
        explanation: row.explanation,
        created_at: parse_timestamp("predictions.created_at", &row.created_at)?,
    })
}
