//! Prediction endpoints.
//!
//! - `POST /api/predictions`: run the risk pipeline for a patient
//! - `GET /api/predictions/patient/:id`: history, newest first (`?limit=10`)
//! - `GET /api/predictions/patient/:id/latest`: most recent prediction
//!
//! The pipeline makes a blocking HTTP call, so it runs on the blocking
//! pool with its own connection and client.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{json_body, parse_id};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::DEFAULT_PREDICTION_LIMIT;
use crate::models::Prediction;
use crate::pipeline::prediction::{
    HttpPredictionClient, PredictionError, PredictionOrchestrator, PredictionStore,
    SqliteFormStore, SqlitePredictionStore,
};

#[derive(Deserialize)]
pub struct CreatePredictionRequest {
    pub patient_id: String,
}

#[derive(Serialize)]
pub struct PredictionResponse {
    pub message: &'static str,
    pub prediction: Prediction,
}

/// `POST /api/predictions`
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<CreatePredictionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictionResponse>), ApiError> {
    let request = json_body(payload)?;
    let patient_id = Uuid::parse_str(request.patient_id.trim()).map_err(|_| {
        PredictionError::Validation(format!("\"patient_id\" must be a valid UUID, got {:?}", request.patient_id))
    })?;

    let prediction = tokio::task::spawn_blocking(move || run_pipeline(&ctx, &patient_id))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {e}")))??;

    Ok((
        StatusCode::CREATED,
        Json(PredictionResponse {
            message: "Prediction generated successfully",
            prediction,
        }),
    ))
}

fn run_pipeline(ctx: &ApiContext, patient_id: &Uuid) -> Result<Prediction, ApiError> {
    let conn = ctx.open_db()?;
    let client = HttpPredictionClient::new(&ctx.prediction_url, ctx.prediction_timeout_secs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let forms = SqliteFormStore::new(&conn);
    let predictions = SqlitePredictionStore::new(&conn);

    let orchestrator = PredictionOrchestrator::new(&forms, &client, &predictions);
    Ok(orchestrator.create_prediction(patient_id)?)
}

#[derive(Deserialize)]
pub struct PredictionHistoryQuery {
    pub limit: Option<u32>,
}

/// `GET /api/predictions/patient/:id`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    Query(query): Query<PredictionHistoryQuery>,
) -> Result<Json<Vec<Prediction>>, ApiError> {
    let patient_id = parse_id(&patient_id)?;
    let limit = query.limit.unwrap_or(DEFAULT_PREDICTION_LIMIT);

    let conn = ctx.open_db()?;
    let store = SqlitePredictionStore::new(&conn);
    Ok(Json(store.list_by_patient(&patient_id, limit)?))
}

/// `GET /api/predictions/patient/:id/latest`
pub async fn latest(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<Prediction>, ApiError> {
    let patient_id = parse_id(&patient_id)?;
    let conn = ctx.open_db()?;
    let store = SqlitePredictionStore::new(&conn);

    store
        .latest_by_patient(&patient_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No predictions found for this patient".into()))
}
