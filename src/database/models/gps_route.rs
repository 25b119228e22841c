use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{DecimalSpec, FieldReader, InsertShape, ValidationError};

/// Hectares: ten integer digits, four decimal places
pub const AREA: DecimalSpec = DecimalSpec::new(14, 4);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GpsRoute {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Coordinates and capture metadata, stored as-is
    pub route_data: Option<Value>,
    pub area: Option<Decimal>,
    /// pulverizar, colher, plantar
    pub activity: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GpsRoute {
    pub fn new(id: Uuid, owner: Uuid, insert: InsertGpsRoute, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            name: insert.name,
            description: insert.description,
            route_data: insert.route_data,
            area: insert.area,
            activity: insert.activity,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertGpsRoute {
    pub name: String,
    pub description: Option<String>,
    pub route_data: Option<Value>,
    pub area: Option<Decimal>,
    pub activity: Option<String>,
}

impl InsertShape for InsertGpsRoute {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let name = r.required_string("name");
        let description = r.optional_string("description");
        let route_data = r.optional_structured_json("routeData");
        let area = r.optional_decimal("area", AREA);
        let activity = r.optional_string("activity");
        r.finish()?;

        Ok(Self {
            name: name.unwrap_or_default(),
            description,
            route_data,
            area,
            activity,
        })
    }
}
