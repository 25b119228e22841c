use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{DecimalSpec, FieldReader, InsertShape, ValidationError};

pub const WEIGHT: DecimalSpec = DecimalSpec::new(8, 2);
pub const DAILY_MILK: DecimalSpec = DecimalSpec::new(6, 2);
pub const MONTHLY_MILK: DecimalSpec = DecimalSpec::new(8, 2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Animal {
    pub id: Uuid,
    pub user_id: Uuid,
    /// vaca, touro, terneiro, ...
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub breed: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub weight: Option<Decimal>,
    pub daily_milk_production: Option<Decimal>,
    pub monthly_milk_production: Option<Decimal>,
    /// produtor, corte, reprodutor, inseminação
    pub category: Option<String>,
    pub photo_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Animal {
    pub fn new(id: Uuid, owner: Uuid, insert: InsertAnimal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            kind: insert.kind,
            breed: insert.breed,
            name: insert.name,
            description: insert.description,
            weight: insert.weight,
            daily_milk_production: insert.daily_milk_production,
            monthly_milk_production: insert.monthly_milk_production,
            category: insert.category,
            photo_url: insert.photo_url,
            birth_date: insert.birth_date,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAnimal {
    #[serde(rename = "type")]
    pub kind: String,
    pub breed: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub weight: Option<Decimal>,
    pub daily_milk_production: Option<Decimal>,
    pub monthly_milk_production: Option<Decimal>,
    pub category: Option<String>,
    pub photo_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl InsertShape for InsertAnimal {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let kind = r.required_string("type");
        let breed = r.optional_string("breed");
        let name = r.required_string("name");
        let description = r.optional_string("description");
        let weight = r.optional_decimal("weight", WEIGHT);
        let daily_milk_production = r.optional_decimal("dailyMilkProduction", DAILY_MILK);
        let monthly_milk_production = r.optional_decimal("monthlyMilkProduction", MONTHLY_MILK);
        let category = r.optional_string("category");
        let photo_url = r.optional_string("photoUrl");
        let birth_date = r.optional_date("birthDate");
        r.finish()?;

        // finish() guarantees the required fields are present
        Ok(Self {
            kind: kind.unwrap_or_default(),
            breed,
            name: name.unwrap_or_default(),
            description,
            weight,
            daily_milk_production,
            monthly_milk_production,
            category,
            photo_url,
            birth_date,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalPatch {
    pub kind: Option<String>,
    pub breed: Option<Option<String>>,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub weight: Option<Option<Decimal>>,
    pub daily_milk_production: Option<Option<Decimal>>,
    pub monthly_milk_production: Option<Option<Decimal>>,
    pub category: Option<Option<String>>,
    pub photo_url: Option<Option<String>>,
    pub birth_date: Option<Option<NaiveDate>>,
}

impl AnimalPatch {
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let patch = Self {
            kind: r.patch_required_string("type"),
            breed: r.patch_string("breed"),
            name: r.patch_required_string("name"),
            description: r.patch_string("description"),
            weight: r.patch_decimal("weight", WEIGHT),
            daily_milk_production: r.patch_decimal("dailyMilkProduction", DAILY_MILK),
            monthly_milk_production: r.patch_decimal("monthlyMilkProduction", MONTHLY_MILK),
            category: r.patch_string("category"),
            photo_url: r.patch_string("photoUrl"),
            birth_date: r.patch_date("birthDate"),
        };
        r.finish()?;
        Ok(patch)
    }

    /// Merge onto `animal`; timestamps are left to the store.
    pub fn apply(self, animal: &mut Animal) {
        if let Some(v) = self.kind {
            animal.kind = v;
        }
        if let Some(v) = self.breed {
            animal.breed = v;
        }
        if let Some(v) = self.name {
            animal.name = v;
        }
        if let Some(v) = self.description {
            animal.description = v;
        }
        if let Some(v) = self.weight {
            animal.weight = v;
        }
        if let Some(v) = self.daily_milk_production {
            animal.daily_milk_production = v;
        }
        if let Some(v) = self.monthly_milk_production {
            animal.monthly_milk_production = v;
        }
        if let Some(v) = self.category {
            animal.category = v;
        }
        if let Some(v) = self.photo_url {
            animal.photo_url = v;
        }
        if let Some(v) = self.birth_date {
            animal.birth_date = v;
        }
    }
}
