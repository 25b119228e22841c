use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{FieldReader, InsertShape, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// ordenha, alimentação, tratamento, ...
    pub category: Option<String>,
    pub is_urgent: bool,
    pub note_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(id: Uuid, owner: Uuid, insert: InsertNote, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            title: insert.title,
            description: insert.description,
            category: insert.category,
            is_urgent: insert.is_urgent,
            note_date: insert.note_date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertNote {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_urgent: bool,
    pub note_date: DateTime<Utc>,
}

impl InsertShape for InsertNote {
    /// `noteDate` falls back to the current time when absent.
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let title = r.required_string("title");
        let description = r.optional_string("description");
        let category = r.optional_string("category");
        let is_urgent = r.optional_bool("isUrgent");
        let note_date = r.optional_timestamp("noteDate");
        r.finish()?;

        Ok(Self {
            title: title.unwrap_or_default(),
            description,
            category,
            is_urgent: is_urgent.unwrap_or(false),
            note_date: note_date.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub is_urgent: Option<bool>,
    pub note_date: Option<DateTime<Utc>>,
}

impl NotePatch {
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let patch = Self {
            title: r.patch_required_string("title"),
            description: r.patch_string("description"),
            category: r.patch_string("category"),
            is_urgent: r.patch_bool("isUrgent"),
            note_date: r.patch_required_timestamp("noteDate"),
        };
        r.finish()?;
        Ok(patch)
    }

    pub fn apply(self, note: &mut Note) {
        if let Some(v) = self.title {
            note.title = v;
        }
        if let Some(v) = self.description {
            note.description = v;
        }
        if let Some(v) = self.category {
            note.category = v;
        }
        if let Some(v) = self.is_urgent {
            note.is_urgent = v;
        }
        if let Some(v) = self.note_date {
            note.note_date = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_date_and_urgency() {
        let before = Utc::now();
        let note = InsertNote::validate(&json!({
            "title": "Ordenha vaca 201",
            "category": "ordenha"
        }))
        .unwrap();
        assert!(!note.is_urgent);
        assert!(note.note_date >= before);
        assert!(note.note_date <= Utc::now());
    }

    #[test]
    fn keeps_back_dated_note_date() {
        let note = InsertNote::validate(&json!({
            "title": "Silagem",
            "noteDate": "2024-12-01T07:00:00Z"
        }))
        .unwrap();
        assert_eq!(note.note_date.to_rfc3339(), "2024-12-01T07:00:00+00:00");
    }

    #[test]
    fn patch_rejects_null_title() {
        let err = NotePatch::validate(&json!({ "title": null })).unwrap_err();
        assert!(err.has("title"));
    }
}
