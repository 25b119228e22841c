//! Insert/patch payload validation.
//!
//! Every entity shape reads its fields through a [`FieldReader`], which records a
//! [`FieldError`] for each field that breaks a rule instead of stopping at the
//! first one. Nothing here touches storage.

pub mod decimal;
pub mod time;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::models::{
    InsertAnimal, InsertGpsRoute, InsertMarketListing, InsertNote, InsertReminder,
    InsertVaccination,
};
use crate::types::EntityKind;

pub use decimal::DecimalSpec;

/// Fields the server assigns; clients may send them but they are never read.
pub const SERVER_ASSIGNED_FIELDS: &[&str] = &["id", "userId", "createdAt", "updatedAt"];

/// The rule a field violated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    Required,
    Blank,
    WrongType { expected: &'static str },
    InvalidFormat { expected: &'static str },
    OutOfRange { detail: String },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("is required"),
            Rule::Blank => f.write_str("must not be blank"),
            Rule::WrongType { expected } => write!(f, "must be {}", expected),
            Rule::InvalidFormat { expected } => write!(f, "must be {}", expected),
            Rule::OutOfRange { detail } => write!(f, "is out of range ({})", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    #[serde(flatten)]
    pub rule: Rule,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

/// All field errors found in one payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("invalid payload: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn single(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            errors: vec![FieldError { field: field.into(), rule }],
        }
    }

    /// True when `field` has at least one error
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn rule_for(&self, field: &str) -> Option<&Rule> {
        self.errors.iter().find(|e| e.field == field).map(|e| &e.rule)
    }

    /// field -> message map used in HTTP error bodies
    pub fn field_messages(&self) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = HashMap::new();
        for err in &self.errors {
            let message = err.rule.to_string();
            map.entry(err.field.clone())
                .and_modify(|existing| {
                    existing.push_str("; ");
                    existing.push_str(&message);
                })
                .or_insert(message);
        }
        map
    }
}

/// Reads typed fields out of a JSON object, accumulating errors.
///
/// Insert readers use `required_*` / `optional_*`; patch readers use `patch_*`,
/// where an absent key means "leave unchanged" and an explicit `null` clears a
/// nullable column. Unknown keys are ignored.
pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a Value) -> Result<Self, ValidationError> {
        let Value::Object(fields) = raw else {
            return Err(ValidationError::single(
                "$body",
                Rule::WrongType { expected: "a JSON object" },
            ));
        };

        for key in SERVER_ASSIGNED_FIELDS {
            if fields.contains_key(*key) {
                tracing::debug!("Ignoring server-assigned field '{}' in payload", key);
            }
        }

        Ok(Self {
            fields,
            errors: Vec::new(),
        })
    }

    fn reject(&mut self, field: &str, rule: Rule) {
        self.errors.push(FieldError {
            field: field.to_string(),
            rule,
        });
    }

    fn read<T>(
        &mut self,
        field: &str,
        required: bool,
        convert: impl FnOnce(&Value) -> Result<T, Rule>,
    ) -> Option<T> {
        match self.fields.get(field) {
            None | Some(Value::Null) => {
                if required {
                    self.reject(field, Rule::Required);
                }
                None
            }
            Some(value) => match convert(value) {
                Ok(v) => Some(v),
                Err(rule) => {
                    self.reject(field, rule);
                    None
                }
            },
        }
    }

    /// `None` = absent, `Some(None)` = explicit null (only when `nullable`)
    fn patch<T>(
        &mut self,
        field: &str,
        nullable: bool,
        convert: impl FnOnce(&Value) -> Result<T, Rule>,
    ) -> Option<Option<T>> {
        match self.fields.get(field) {
            None => None,
            Some(Value::Null) if nullable => Some(None),
            Some(Value::Null) => {
                self.reject(field, Rule::Required);
                None
            }
            Some(value) => match convert(value) {
                Ok(v) => Some(Some(v)),
                Err(rule) => {
                    self.reject(field, rule);
                    None
                }
            },
        }
    }

    // -- insert readers --

    pub fn required_string(&mut self, field: &str) -> Option<String> {
        self.read(field, true, non_blank_string)
    }

    pub fn optional_string(&mut self, field: &str) -> Option<String> {
        self.read(field, false, any_string)
    }

    pub fn optional_bool(&mut self, field: &str) -> Option<bool> {
        self.read(field, false, boolean)
    }

    pub fn optional_non_negative_i32(&mut self, field: &str) -> Option<i32> {
        self.read(field, false, non_negative_i32)
    }

    pub fn optional_decimal(&mut self, field: &str, spec: DecimalSpec) -> Option<Decimal> {
        self.read(field, false, |v| spec.from_json(v))
    }

    pub fn required_timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        self.read(field, true, timestamp)
    }

    pub fn optional_timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        self.read(field, false, timestamp)
    }

    pub fn optional_date(&mut self, field: &str) -> Option<NaiveDate> {
        self.read(field, false, date)
    }

    pub fn required_uuid(&mut self, field: &str) -> Option<Uuid> {
        self.read(field, true, uuid)
    }

    pub fn optional_structured_json(&mut self, field: &str) -> Option<Value> {
        self.read(field, false, structured_json)
    }

    // -- patch readers --

    pub fn patch_required_string(&mut self, field: &str) -> Option<String> {
        self.patch(field, false, non_blank_string).flatten()
    }

    pub fn patch_string(&mut self, field: &str) -> Option<Option<String>> {
        self.patch(field, true, any_string)
    }

    pub fn patch_bool(&mut self, field: &str) -> Option<bool> {
        self.patch(field, false, boolean).flatten()
    }

    pub fn patch_decimal(&mut self, field: &str, spec: DecimalSpec) -> Option<Option<Decimal>> {
        self.patch(field, true, |v| spec.from_json(v))
    }

    pub fn patch_required_timestamp(&mut self, field: &str) -> Option<DateTime<Utc>> {
        self.patch(field, false, timestamp).flatten()
    }

    pub fn patch_date(&mut self, field: &str) -> Option<Option<NaiveDate>> {
        self.patch(field, true, date)
    }

    /// Ok when no field failed
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

fn any_string(value: &Value) -> Result<String, Rule> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(Rule::WrongType { expected: "a string" }),
    }
}

fn non_blank_string(value: &Value) -> Result<String, Rule> {
    let s = any_string(value)?;
    if s.trim().is_empty() {
        return Err(Rule::Blank);
    }
    Ok(s)
}

fn boolean(value: &Value) -> Result<bool, Rule> {
    value
        .as_bool()
        .ok_or(Rule::WrongType { expected: "a boolean" })
}

fn non_negative_i32(value: &Value) -> Result<i32, Rule> {
    let n = value
        .as_i64()
        .ok_or(Rule::WrongType { expected: "an integer" })?;
    if n < 0 {
        return Err(Rule::OutOfRange {
            detail: "must not be negative".to_string(),
        });
    }
    i32::try_from(n).map_err(|_| Rule::OutOfRange {
        detail: format!("must be at most {}", i32::MAX),
    })
}

fn timestamp(value: &Value) -> Result<DateTime<Utc>, Rule> {
    let s = value
        .as_str()
        .ok_or(Rule::WrongType { expected: "a timestamp string" })?;
    time::parse_timestamp(s).ok_or(Rule::InvalidFormat {
        expected: "an RFC 3339 timestamp or YYYY-MM-DD date",
    })
}

fn date(value: &Value) -> Result<NaiveDate, Rule> {
    let s = value
        .as_str()
        .ok_or(Rule::WrongType { expected: "a date string" })?;
    time::parse_date(s).ok_or(Rule::InvalidFormat {
        expected: "a YYYY-MM-DD date",
    })
}

fn uuid(value: &Value) -> Result<Uuid, Rule> {
    let s = value
        .as_str()
        .ok_or(Rule::WrongType { expected: "a string id" })?;
    Uuid::parse_str(s.trim()).map_err(|_| Rule::InvalidFormat { expected: "a UUID" })
}

fn structured_json(value: &Value) -> Result<Value, Rule> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value.clone()),
        _ => Err(Rule::WrongType {
            expected: "a JSON object or array",
        }),
    }
}

/// Implemented by every insert shape
pub trait InsertShape: Sized {
    fn validate(raw: &Value) -> Result<Self, ValidationError>;
}

/// A validated insert payload, tagged by entity kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum InsertRecord {
    Animal(InsertAnimal),
    Vaccination(InsertVaccination),
    Reminder(InsertReminder),
    Note(InsertNote),
    MarketListing(InsertMarketListing),
    GpsRoute(InsertGpsRoute),
}

impl InsertRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            InsertRecord::Animal(_) => EntityKind::Animal,
            InsertRecord::Vaccination(_) => EntityKind::Vaccination,
            InsertRecord::Reminder(_) => EntityKind::Reminder,
            InsertRecord::Note(_) => EntityKind::Note,
            InsertRecord::MarketListing(_) => EntityKind::MarketListing,
            InsertRecord::GpsRoute(_) => EntityKind::GpsRoute,
        }
    }
}

/// Validate `raw` against the insert shape of `kind`
pub fn validate_insert(kind: EntityKind, raw: &Value) -> Result<InsertRecord, ValidationError> {
    match kind {
        EntityKind::Animal => InsertAnimal::validate(raw).map(InsertRecord::Animal),
        EntityKind::Vaccination => InsertVaccination::validate(raw).map(InsertRecord::Vaccination),
        EntityKind::Reminder => InsertReminder::validate(raw).map(InsertRecord::Reminder),
        EntityKind::Note => InsertNote::validate(raw).map(InsertRecord::Note),
        EntityKind::MarketListing => {
            InsertMarketListing::validate(raw).map(InsertRecord::MarketListing)
        }
        EntityKind::GpsRoute => InsertGpsRoute::validate(raw).map(InsertRecord::GpsRoute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_body_is_rejected() {
        let err = FieldReader::new(&json!([1, 2])).err().unwrap();
        assert!(err.has("$body"));
    }

    #[test]
    fn collects_every_failing_field() {
        let raw = json!({ "title": "  ", "isUrgent": "yes" });
        let mut r = FieldReader::new(&raw).unwrap();
        r.required_string("title");
        r.required_string("category");
        r.optional_bool("isUrgent");
        let err = r.finish().unwrap_err();

        assert_eq!(err.errors.len(), 3);
        assert_eq!(err.rule_for("title"), Some(&Rule::Blank));
        assert_eq!(err.rule_for("category"), Some(&Rule::Required));
        assert_eq!(
            err.rule_for("isUrgent"),
            Some(&Rule::WrongType { expected: "a boolean" })
        );
    }

    #[test]
    fn null_is_absent_for_inserts() {
        let raw = json!({ "breed": null });
        let mut r = FieldReader::new(&raw).unwrap();
        assert_eq!(r.optional_string("breed"), None);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let raw = json!({ "description": null, "title": null });
        let mut r = FieldReader::new(&raw).unwrap();
        assert_eq!(r.patch_string("description"), Some(None));
        assert_eq!(r.patch_string("category"), None);
        assert_eq!(r.patch_required_string("title"), None);
        let err = r.finish().unwrap_err();
        assert_eq!(err.rule_for("title"), Some(&Rule::Required));
    }

    #[test]
    fn negative_integers_are_out_of_range() {
        let raw = json!({ "quarantineDays": -3 });
        let mut r = FieldReader::new(&raw).unwrap();
        assert_eq!(r.optional_non_negative_i32("quarantineDays"), None);
        let err = r.finish().unwrap_err();
        assert!(matches!(err.rule_for("quarantineDays"), Some(Rule::OutOfRange { .. })));
    }

    #[test]
    fn structured_json_rejects_scalars() {
        let raw = json!({ "routeData": "lat,lng", "other": { "coordinates": [] } });
        let mut r = FieldReader::new(&raw).unwrap();
        assert_eq!(r.optional_structured_json("routeData"), None);
        assert!(r.optional_structured_json("other").is_some());
        assert!(r.finish().unwrap_err().has("routeData"));
    }

    #[test]
    fn field_messages_join_multiple_rules() {
        let err = ValidationError {
            errors: vec![
                FieldError { field: "name".into(), rule: Rule::Required },
                FieldError { field: "name".into(), rule: Rule::Blank },
            ],
        };
        let map = err.field_messages();
        assert_eq!(map["name"], "is required; must not be blank");
    }

    #[test]
    fn validate_insert_dispatches_by_kind() {
        let raw = json!({ "name": "Talhão norte" });
        let record = validate_insert(EntityKind::GpsRoute, &raw).unwrap();
        assert_eq!(record.kind(), EntityKind::GpsRoute);

        let err = validate_insert(EntityKind::Animal, &raw).unwrap_err();
        assert!(err.has("type"));
    }
}
