//! Form endpoints.
//!
//! - `POST /api/forms`: submit a form
//! - `GET /api/forms/patient/:id`: history view (`?days=7|all&limit=50`)
//! - `GET /api/forms/patient/:id/latest`: latest biometrics and lifestyle pair

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::endpoints::{json_body, parse_id};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::forms::{self, FormHistoryEntry, FormSubmission, LatestForms};
use crate::models::{HistoryWindow, PatientForm, DEFAULT_HISTORY_LIMIT};
use crate::pipeline::prediction::SqliteFormStore;

#[derive(Serialize)]
pub struct FormResponse {
    pub message: &'static str,
    pub form: PatientForm,
}

/// `POST /api/forms`
pub async fn submit(
    State(ctx): State<ApiContext>,
    payload: Result<Json<FormSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<FormResponse>), ApiError> {
    let submission = json_body(payload)?;
    submission.validate().map_err(ApiError::BadRequest)?;

    let conn = ctx.open_db()?;
    let form = forms::submit_form(&conn, submission)?;

    Ok((
        StatusCode::CREATED,
        Json(FormResponse {
            message: "Form submitted successfully",
            form,
        }),
    ))
}

#[derive(Deserialize)]
pub struct FormHistoryQuery {
    pub days: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /api/forms/patient/:id`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(query): Query<FormHistoryQuery>,
) -> Result<Json<Vec<FormHistoryEntry>>, ApiError> {
    let patient_id = parse_id(&patient_id)?;
    let window = match query.days.as_deref() {
        Some(raw) => raw.parse::<HistoryWindow>().map_err(ApiError::BadRequest)?,
        None => HistoryWindow::default(),
    };
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);

    let conn = ctx.open_db()?;
    let store = SqliteFormStore::new(&conn);
    Ok(Json(forms::fetch_form_history(&store, &patient_id, window, limit)?))
}

/// `GET /api/forms/patient/:id/latest`
pub async fn latest(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<LatestForms>, ApiError> {
    let patient_id = parse_id(&patient_id)?;
    let conn = ctx.open_db()?;
    let store = SqliteFormStore::new(&conn);

    forms::fetch_latest_forms(&store, &patient_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Both biometrics and lifestyle forms are required".into()))
}
