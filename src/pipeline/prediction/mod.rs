//! Risk prediction pipeline.
//!
//! Gathers the latest biometrics and lifestyle forms for a patient, asks the
//! external prediction service for an assessment, falls back to the
//! rule-based scorer when the service is unavailable, and persists the
//! result as a new prediction row.

pub mod client;
pub mod orchestrator;
pub mod scorer;
pub mod store;
pub mod types;

pub use client::*;
pub use orchestrator::*;
pub use scorer::*;
pub use store::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::FormType;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Missing required forms for prediction: {}", format_missing(.missing))]
    MissingRequiredForms { missing: Vec<FormType> },

    #[error("Persistence error: {0}")]
    Persistence(#[from] DatabaseError),
}

fn format_missing(missing: &[FormType]) -> String {
    missing
        .iter()
        .map(|ft| ft.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
