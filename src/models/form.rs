use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::enums::FormType;

/// Open bag of named measurements submitted with a form.
pub type FormValues = Map<String, Value>;

/// A patient-submitted form. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "type")]
    pub form_type: FormType,
    pub values: FormValues,
    pub created_at: NaiveDateTime,
}

/// Default number of history rows returned.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Largest accepted `days` value (about a century).
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// How far back a form history query reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    Days(u32),
    All,
}

impl HistoryWindow {
    /// Lower bound on `created_at`, or `None` when unbounded.
    ///
    /// A window reaching past the earliest representable time is unbounded.
    pub fn since(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            HistoryWindow::Days(days) => chrono::Duration::try_days(i64::from(*days))
                .and_then(|span| now.checked_sub_signed(span)),
            HistoryWindow::All => None,
        }
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Days(7)
    }
}

impl std::str::FromStr for HistoryWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(HistoryWindow::All),
            other => match other.parse::<u32>() {
                Ok(days) if days <= MAX_HISTORY_DAYS => Ok(HistoryWindow::Days(days)),
                Ok(_) => Err(format!(
                    "\"days\" must be at most {MAX_HISTORY_DAYS} or \"all\", got {other:?}"
                )),
                Err(_) => Err(format!("\"days\" must be a number or \"all\", got {other:?}")),
            },
        }
    }
}

/// Reject nested arrays/objects: form values are flat scalars.
pub fn validate_form_values(values: &FormValues) -> Result<(), String> {
    for (key, value) in values {
        if key.trim().is_empty() {
            return Err("\"values\" keys must not be empty".into());
        }
        if value.is_array() || value.is_object() {
            return Err(format!("\"values.{key}\" must be a scalar"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn scalar_values_accepted() {
        let v = values(json!({"systolic": 120, "smoking": "no", "notes": null, "active": true}));
        assert!(validate_form_values(&v).is_ok());
    }

    #[test]
    fn nested_values_rejected() {
        let v = values(json!({"bp": {"systolic": 120}}));
        assert_eq!(validate_form_values(&v).unwrap_err(), "\"values.bp\" must be a scalar");
        let v = values(json!({"meds": ["a", "b"]}));
        assert!(validate_form_values(&v).is_err());
    }

    #[test]
    fn history_window_parses_days_and_all() {
        assert_eq!("all".parse::<HistoryWindow>().unwrap(), HistoryWindow::All);
        assert_eq!("30".parse::<HistoryWindow>().unwrap(), HistoryWindow::Days(30));
        assert!("-3".parse::<HistoryWindow>().is_err());
        assert!("week".parse::<HistoryWindow>().is_err());
    }

    #[test]
    fn history_window_since() {
        let now = NaiveDateTime::parse_from_str("2026-03-10 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let since = HistoryWindow::Days(7).since(now).unwrap();
        assert_eq!(since.to_string(), "2026-03-03 12:00:00");
        assert!(HistoryWindow::All.since(now).is_none());
        assert_eq!(HistoryWindow::default(), HistoryWindow::Days(7));
    }

    #[test]
    fn history_window_caps_days() {
        assert_eq!(
            MAX_HISTORY_DAYS.to_string().parse::<HistoryWindow>().unwrap(),
            HistoryWindow::Days(MAX_HISTORY_DAYS)
        );
        assert!("36501".parse::<HistoryWindow>().is_err());
        assert!("1000000000".parse::<HistoryWindow>().is_err());
        assert!(u32::MAX.to_string().parse::<HistoryWindow>().is_err());
    }

    #[test]
    fn huge_window_is_unbounded_instead_of_overflowing() {
        let now = chrono::Utc::now().naive_utc();
        assert!(HistoryWindow::Days(u32::MAX).since(now).is_none());
        assert!(HistoryWindow::Days(1_000_000_000).since(now).is_none());
        assert!(HistoryWindow::Days(MAX_HISTORY_DAYS).since(now).is_some());
    }

    #[test]
    fn form_type_field_renamed() {
        let form = PatientForm {
            id: Uuid::nil(),
            patient_id: Uuid::nil(),
            form_type: FormType::Biometrics,
            values: FormValues::new(),
            created_at: NaiveDateTime::default(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["type"], "biometrics");
    }
}
