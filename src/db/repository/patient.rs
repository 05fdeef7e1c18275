use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::sqlite::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::{Gender, Patient, PatientDetails};

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, age, gender, location, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.age,
            patient.gender.as_str(),
            patient.location,
            format_timestamp(&patient.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, location, created_at
         FROM patients WHERE id = ?1",
    )?;
    let result = stmt.query_row(params![id.to_string()], read_patient_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All patients, most recently registered first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, location, created_at
         FROM patients ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map([], read_patient_row)?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Overwrite the editable fields of a patient and return the updated record.
pub fn update_patient(
    conn: &Connection,
    id: &Uuid,
    details: &PatientDetails,
) -> Result<Patient, DatabaseError> {
    let affected = conn.execute(
        "UPDATE patients SET name = ?2, age = ?3, gender = ?4, location = ?5 WHERE id = ?1",
        params![
            id.to_string(),
            details.name,
            details.age,
            details.gender.as_str(),
            details.location,
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: id.to_string(),
        });
    }
    get_patient(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "patient".into(),
        id: id.to_string(),
    })
}

struct PatientRow {
    id: String,
    name: String,
    age: i32,
    gender: String,
    location: Option<String>,
    created_at: String,
}

fn read_patient_row(row: &rusqlite::Row) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: row.get(3)?,
        location: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        name: row.name,
        age: row.age,
        gender: Gender::from_str(&row.gender)?,
        location: row.location,
        created_at: parse_timestamp("patients.created_at", &row.created_at)?,
    })
}
