use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{FieldReader, InsertShape, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vaccination {
    pub id: Uuid,
    pub animal_id: Uuid,
    pub vaccine_name: String,
    pub application_date: DateTime<Utc>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub quarantine_days: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vaccination {
    pub fn new(id: Uuid, insert: InsertVaccination, now: DateTime<Utc>) -> Self {
        Self {
            id,
            animal_id: insert.animal_id,
            vaccine_name: insert.vaccine_name,
            application_date: insert.application_date,
            next_due_date: insert.next_due_date,
            quarantine_days: insert.quarantine_days,
            notes: insert.notes,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertVaccination {
    pub animal_id: Uuid,
    pub vaccine_name: String,
    pub application_date: DateTime<Utc>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub quarantine_days: Option<i32>,
    pub notes: Option<String>,
}

impl InsertShape for InsertVaccination {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let animal_id = r.required_uuid("animalId");
        let vaccine_name = r.required_string("vaccineName");
        let application_date = r.required_timestamp("applicationDate");
        let next_due_date = r.optional_timestamp("nextDueDate");
        let quarantine_days = r.optional_non_negative_i32("quarantineDays");
        let notes = r.optional_string("notes");
        r.finish()?;

        Ok(Self {
            animal_id: animal_id.unwrap_or_default(),
            vaccine_name: vaccine_name.unwrap_or_default(),
            application_date: application_date.unwrap_or_default(),
            next_due_date,
            quarantine_days,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requires_animal_name_and_date() {
        let err = InsertVaccination::validate(&json!({ "notes": "lote 42" })).unwrap_err();
        assert!(err.has("animalId"));
        assert!(err.has("vaccineName"));
        assert!(err.has("applicationDate"));
    }

    #[test]
    fn rejects_malformed_animal_id() {
        let err = InsertVaccination::validate(&json!({
            "animalId": "201",
            "vaccineName": "Aftosa",
            "applicationDate": "2025-05-01"
        }))
        .unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert!(err.has("animalId"));
    }

    #[test]
    fn accepts_valid_payload() {
        let animal_id = Uuid::new_v4();
        let v = InsertVaccination::validate(&json!({
            "animalId": animal_id.to_string(),
            "vaccineName": "Brucelose",
            "applicationDate": "2025-05-01T10:00:00Z",
            "nextDueDate": "2026-05-01",
            "quarantineDays": 30
        }))
        .unwrap();
        assert_eq!(v.animal_id, animal_id);
        assert_eq!(v.quarantine_days, Some(30));
        assert!(v.next_due_date.is_some());
    }
}
