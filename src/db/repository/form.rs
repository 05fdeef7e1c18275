use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{FormType, FormValues, PatientForm};

const FORM_COLUMNS: &str = "id, patient_id, type, form_values, created_at";

pub fn insert_form(conn: &Connection, form: &PatientForm) -> Result<(), DatabaseError> {
    let values_json = serde_json::to_string(&form.values)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO patient_forms (id, patient_id, type, form_values, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            form.id.to_string(),
            form.patient_id.to_string(),
            form.form_type.as_str(),
            values_json,
            format_timestamp(&form.created_at),
        ],
    )?;
    Ok(())
}

/// Most recently created form of one type for a patient.
pub fn get_latest_form(
    conn: &Connection,
    patient_id: &Uuid,
    form_type: FormType,
) -> Result<Option<PatientForm>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM patient_forms
         WHERE patient_id = ?1 AND type = ?2
         ORDER BY created_at DESC, rowid DESC
         LIMIT 1"
    ))?;
    let mut rows = stmt.query_map(
        params![patient_id.to_string(), form_type.as_str()],
        read_form_row,
    )?;
    match rows.next() {
        Some(row) => Ok(Some(form_from_row(row?)?)),
        None => Ok(None),
    }
}

/// Forms for a patient, newest first, optionally bounded below by `since`.
pub fn get_form_history(
    conn: &Connection,
    patient_id: &Uuid,
    since: Option<&NaiveDateTime>,
    limit: u32,
) -> Result<Vec<PatientForm>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM patient_forms
         WHERE patient_id = ?1 AND (?2 IS NULL OR created_at >= ?2)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3"
    ))?;
    let rows = stmt.query_map(
        params![
            patient_id.to_string(),
            since.map(format_timestamp),
            i64::from(limit),
        ],
        read_form_row,
    )?;

    let mut forms = Vec::new();
    for row in rows {
        forms.push(form_from_row(row?)?);
    }
    Ok(forms)
}

struct FormRow {
    id: String,
    patient_id: String,
    form_type: String,
    values: String,
    created_at: String,
}

fn read_form_row(row: &rusqlite::Row) -> Result<FormRow, rusqlite::Error> {
    Ok(FormRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        form_type: row.get(2)?,
        values: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn form_from_row(row: FormRow) -> Result<PatientForm, DatabaseError> {
    let values: FormValues =
        serde_json::from_str(&row.values).map_err(|e| DatabaseError::CorruptValue {
            column: "patient_forms.form_values".into(),
            reason: e.to_string(),
        })?;
    Ok(PatientForm {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        patient_id: Uuid::parse_str(&row.patient_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        form_type: FormType::from_str(&row.form_type)?,
        values,
        created_at: parse_timestamp("patient_forms.created_at", &row.created_at)?,
    })
}
