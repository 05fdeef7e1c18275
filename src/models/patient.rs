use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Gender;

pub const NAME_MAX_LEN: usize = 255;
pub const LOCATION_MAX_LEN: usize = 255;
pub const AGE_MIN: i32 = 1;
pub const AGE_MAX: i32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub location: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Caller-supplied patient fields for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    #[serde(default)]
    pub location: Option<String>,
}

impl PatientDetails {
    /// Check field bounds. Returns the first violation as a message.
    pub fn validate(&self) -> Result<(), String> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            return Err("\"name\" is not allowed to be empty".into());
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(format!("\"name\" must be at most {NAME_MAX_LEN} characters"));
        }
        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            return Err(format!("\"age\" must be between {AGE_MIN} and {AGE_MAX}"));
        }
        if let Some(location) = &self.location {
            if location.chars().count() > LOCATION_MAX_LEN {
                return Err(format!(
                    "\"location\" must be at most {LOCATION_MAX_LEN} characters"
                ));
            }
        }
        Ok(())
    }
}
