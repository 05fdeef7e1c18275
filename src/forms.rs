//! Patient form submission and history views.
//!
//! Submission validates and stores a new form. History rows carry the raw
//! values plus a few display vitals (blood pressure, glucose, heart rate,
//! BMI) so dashboards do not have to dig through the value bag.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::db::sqlite::now_timestamp;
use crate::db::{self, DatabaseError};
use crate::models::{validate_form_values, FormType, FormValues, HistoryWindow, PatientForm};
use crate::pipeline::prediction::{derive_bmi, FormStore};

const NOT_AVAILABLE: &str = "N/A";

// ═══════════════════════════════════════════
// Submission
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct FormSubmission {
    pub patient_id: Uuid,
    #[serde(rename = "type")]
    pub form_type: FormType,
    pub values: FormValues,
}

/// Store a new form for an existing patient.
pub fn submit_form(conn: &Connection, submission: FormSubmission) -> Result<PatientForm, DatabaseError> {
    if db::get_patient(conn, &submission.patient_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: submission.patient_id.to_string(),
        });
    }

    let form = PatientForm {
        id: Uuid::new_v4(),
        patient_id: submission.patient_id,
        form_type: submission.form_type,
        values: submission.values,
        created_at: now_timestamp(),
    };
    db::insert_form(conn, &form)?;

    tracing::info!(
        patient_id = %form.patient_id,
        form_type = form.form_type.as_str(),
        "Form submitted"
    );
    Ok(form)
}

impl FormSubmission {
    pub fn validate(&self) -> Result<(), String> {
        validate_form_values(&self.values)
    }
}

// ═══════════════════════════════════════════
// History
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormHistoryEntry {
    pub id: Uuid,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub form_type: FormType,
    pub values: FormValues,
    pub blood_pressure: String,
    pub glucose: String,
    pub heart_rate: String,
    pub bmi: String,
}

impl From<PatientForm> for FormHistoryEntry {
    fn from(form: PatientForm) -> Self {
        let values = &form.values;
        let blood_pressure = present(values, "bloodPressure")
            .map(display_scalar)
            .or_else(|| {
                let systolic = present(values, "systolic")?;
                let diastolic = present(values, "diastolic")?;
                Some(format!("{}/{}", display_scalar(systolic), display_scalar(diastolic)))
            });
        let bmi = present(values, "bmi").map(display_scalar).or_else(|| {
            let weight = present(values, "weight").and_then(as_number)?;
            let height = present(values, "height").and_then(as_number)?;
            derive_bmi(weight, height).map(|b| format!("{b:.1}"))
        });

        Self {
            glucose: or_not_available(present(values, "glucose").map(display_scalar)),
            heart_rate: or_not_available(present(values, "heartRate").map(display_scalar)),
            blood_pressure: or_not_available(blood_pressure),
            bmi: or_not_available(bmi),
            id: form.id,
            date: form.created_at,
            form_type: form.form_type,
            values: form.values,
        }
    }
}

/// Forms for a patient inside `window`, newest first.
pub fn fetch_form_history(
    store: &dyn FormStore,
    patient_id: &Uuid,
    window: HistoryWindow,
    limit: u32,
) -> Result<Vec<FormHistoryEntry>, DatabaseError> {
    let forms = store.history(patient_id, window, limit)?;
    Ok(forms.into_iter().map(FormHistoryEntry::from).collect())
}

/// The two forms a risk assessment needs.
#[derive(Debug, Clone, Serialize)]
pub struct LatestForms {
    pub biometrics: PatientForm,
    pub lifestyle: PatientForm,
}

/// Latest biometrics and lifestyle forms, or `None` when either is missing.
pub fn fetch_latest_forms(
    store: &dyn FormStore,
    patient_id: &Uuid,
) -> Result<Option<LatestForms>, DatabaseError> {
    let biometrics = store.latest(patient_id, FormType::Biometrics)?;
    let lifestyle = store.latest(patient_id, FormType::Lifestyle)?;
    Ok(match (biometrics, lifestyle) {
        (Some(biometrics), Some(lifestyle)) => Some(LatestForms { biometrics, lifestyle }),
        _ => None,
    })
}

// ── helpers ──

/// Value for `key`, skipping nulls, `false` and empty strings.
fn present<'v>(values: &'v FormValues, key: &str) -> Option<&'v Value> {
    values.get(key).filter(|v| match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    })
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{Gender, Patient};
    use crate::pipeline::prediction::SqliteFormStore;

    fn setup() -> (Connection, Uuid) {
        let conn = open_memory_database().unwrap();
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Lena".into(),
            age: 44,
            gender: Gender::Female,
            location: Some("Porto".into()),
            created_at: now_timestamp(),
        };
        db::insert_patient(&conn, &patient).unwrap();
        (conn, patient.id)
    }

    fn submission(patient_id: Uuid, form_type: FormType, values: Value) -> FormSubmission {
        FormSubmission {
            patient_id,
            form_type,
            values: values.as_object().cloned().unwrap(),
        }
    }

    fn entry(values: Value) -> FormHistoryEntry {
        FormHistoryEntry::from(PatientForm {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            form_type: FormType::Biometrics,
            values: values.as_object().cloned().unwrap(),
            created_at: now_timestamp(),
        })
    }

    #[test]
    fn submit_form_stores_and_returns_form() {
        let (conn, pid) = setup();
        let form = submit_form(&conn, submission(pid, FormType::Biometrics, json!({"glucose": 101}))).unwrap();

        let stored = db::get_latest_form(&conn, &pid, FormType::Biometrics).unwrap().unwrap();
        assert_eq!(stored, form);
    }

    #[test]
    fn submit_form_for_unknown_patient_is_not_found() {
        let (conn, _) = setup();
        let result = submit_form(&conn, submission(Uuid::new_v4(), FormType::Lifestyle, json!({})));
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn submission_deserializes_type_field() {
        let pid = Uuid::new_v4();
        let raw = json!({"patient_id": pid, "type": "lifestyle", "values": {"smoking": "no"}});
        let parsed: FormSubmission = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.form_type, FormType::Lifestyle);
        assert!(parsed.validate().is_ok());

        let bad = json!({"patient_id": pid, "type": "diet", "values": {}});
        assert!(serde_json::from_value::<FormSubmission>(bad).is_err());
    }

    #[test]
    fn history_entry_extracts_vitals() {
        let e = entry(json!({"systolic": 132, "diastolic": 84, "glucose": 98, "heartRate": "71"}));
        assert_eq!(e.blood_pressure, "132/84");
        assert_eq!(e.glucose, "98");
        assert_eq!(e.heart_rate, "71");
        assert_eq!(e.bmi, NOT_AVAILABLE);
    }

    #[test]
    fn history_entry_prefers_blood_pressure_field() {
        let e = entry(json!({"bloodPressure": "118/76", "systolic": 150, "diastolic": 95}));
        assert_eq!(e.blood_pressure, "118/76");
    }

    #[test]
    fn history_entry_needs_both_pressures() {
        let e = entry(json!({"systolic": 150}));
        assert_eq!(e.blood_pressure, NOT_AVAILABLE);
    }

    #[test]
    fn history_entry_derives_bmi_one_decimal() {
        let e = entry(json!({"weight": 90, "height": 180}));
        assert_eq!(e.bmi, "27.8");
        let explicit = entry(json!({"bmi": 22.5, "weight": 90, "height": 180}));
        assert_eq!(explicit.bmi, "22.5");
    }

    #[test]
    fn history_entry_serializes_camel_case() {
        let json = serde_json::to_value(entry(json!({"heartRate": 64}))).unwrap();
        assert_eq!(json["heartRate"], "64");
        assert_eq!(json["bloodPressure"], NOT_AVAILABLE);
        assert_eq!(json["type"], "biometrics");
        assert!(json.get("date").is_some());
    }

    #[test]
    fn fetch_history_and_latest_pair() {
        let (conn, pid) = setup();
        let store = SqliteFormStore::new(&conn);

        submit_form(&conn, submission(pid, FormType::Biometrics, json!({"weight": 70, "height": 175}))).unwrap();
        assert!(fetch_latest_forms(&store, &pid).unwrap().is_none());

        submit_form(&conn, submission(pid, FormType::Lifestyle, json!({"exercise": "daily"}))).unwrap();
        let latest = fetch_latest_forms(&store, &pid).unwrap().unwrap();
        assert_eq!(latest.biometrics.form_type, FormType::Biometrics);
        assert_eq!(latest.lifestyle.form_type, FormType::Lifestyle);

        let history = fetch_form_history(&store, &pid, HistoryWindow::default(), 50).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].form_type, FormType::Lifestyle);
        assert_eq!(history[1].bmi, "22.9");
    }
}
