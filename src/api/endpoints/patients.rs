//! Patient endpoints.
//!
//! - `GET /api/patients`: all patients, newest first
//! - `POST /api/patients`: register a patient
//! - `GET /api/patients/:id`: one patient
//! - `PUT /api/patients/:id`: replace a patient's details

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::endpoints::{json_body, parse_id};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{self, sqlite::now_timestamp};
use crate::models::{Patient, PatientDetails};

#[derive(Serialize)]
pub struct PatientResponse {
    pub message: &'static str,
    pub patient: Patient,
}

/// `GET /api/patients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(db::list_patients(&conn)?))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    db::get_patient(&conn, &id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Patient not found".into()))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PatientDetails>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientResponse>), ApiError> {
    let details = json_body(payload)?;
    details.validate().map_err(ApiError::BadRequest)?;

    let patient = Patient {
        id: Uuid::new_v4(),
        name: details.name,
        age: details.age,
        gender: details.gender,
        location: details.location,
        created_at: now_timestamp(),
    };
    let conn = ctx.open_db()?;
    db::insert_patient(&conn, &patient)?;
    tracing::info!(patient_id = %patient.id, "Patient created");

    Ok((
        StatusCode::CREATED,
        Json(PatientResponse {
            message: "Patient created successfully",
            patient,
        }),
    ))
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    payload: Result<Json<PatientDetails>, JsonRejection>,
) -> Result<Json<PatientResponse>, ApiError> {
    let id = parse_id(&id)?;
    let details = json_body(payload)?;
    details.validate().map_err(ApiError::BadRequest)?;

    let conn = ctx.open_db()?;
    let patient = db::update_patient(&conn, &id, &details)?;

    Ok(Json(PatientResponse {
        message: "Patient updated successfully",
        patient,
    }))
}
