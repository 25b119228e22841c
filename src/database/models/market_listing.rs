use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::validation::{DecimalSpec, FieldReader, InsertShape, ValidationError};

pub const PRICE: DecimalSpec = DecimalSpec::new(10, 2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MarketListing {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// sementes, equipamentos, gado, insumos
    pub category: String,
    pub price: Option<Decimal>,
    /// novo, usado, ...
    pub condition: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketListing {
    pub fn new(id: Uuid, owner: Uuid, insert: InsertMarketListing, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            title: insert.title,
            description: insert.description,
            category: insert.category,
            price: insert.price,
            condition: insert.condition,
            location: insert.location,
            contact_info: insert.contact_info,
            image_url: insert.image_url,
            is_active: insert.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertMarketListing {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Option<Decimal>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

impl InsertShape for InsertMarketListing {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let title = r.required_string("title");
        let description = r.optional_string("description");
        let category = r.required_string("category");
        let price = r.optional_decimal("price", PRICE);
        let condition = r.optional_string("condition");
        let location = r.optional_string("location");
        let contact_info = r.optional_string("contactInfo");
        let image_url = r.optional_string("imageUrl");
        let is_active = r.optional_bool("isActive");
        r.finish()?;

        Ok(Self {
            title: title.unwrap_or_default(),
            description,
            category: category.unwrap_or_default(),
            price,
            condition,
            location,
            contact_info,
            image_url,
            is_active: is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketListingPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub price: Option<Option<Decimal>>,
    pub condition: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub contact_info: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl MarketListingPatch {
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let patch = Self {
            title: r.patch_required_string("title"),
            description: r.patch_string("description"),
            category: r.patch_required_string("category"),
            price: r.patch_decimal("price", PRICE),
            condition: r.patch_string("condition"),
            location: r.patch_string("location"),
            contact_info: r.patch_string("contactInfo"),
            image_url: r.patch_string("imageUrl"),
            is_active: r.patch_bool("isActive"),
        };
        r.finish()?;
        Ok(patch)
    }

    pub fn apply(self, listing: &mut MarketListing) {
        if let Some(v) = self.title {
            listing.title = v;
        }
        if let Some(v) = self.description {
            listing.description = v;
        }
        if let Some(v) = self.category {
            listing.category = v;
        }
        if let Some(v) = self.price {
            listing.price = v;
        }
        if let Some(v) = self.condition {
            listing.condition = v;
        }
        if let Some(v) = self.location {
            listing.location = v;
        }
        if let Some(v) = self.contact_info {
            listing.contact_info = v;
        }
        if let Some(v) = self.image_url {
            listing.image_url = v;
        }
        if let Some(v) = self.is_active {
            listing.is_active = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listings_are_active_by_default() {
        let l = InsertMarketListing::validate(&json!({
            "title": "Trator usado",
            "category": "equipamentos",
            "price": "85000"
        }))
        .unwrap();
        assert!(l.is_active);
        assert_eq!(l.price.unwrap().to_string(), "85000.00");
    }

    #[test]
    fn patch_can_deactivate() {
        let insert = InsertMarketListing::validate(&json!({
            "title": "Sementes de soja", "category": "sementes"
        }))
        .unwrap();
        let mut listing = MarketListing::new(Uuid::new_v4(), Uuid::new_v4(), insert, Utc::now());
        MarketListingPatch::validate(&json!({ "isActive": false }))
            .unwrap()
            .apply(&mut listing);
        assert!(!listing.is_active);
    }

    #[test]
    fn price_is_serialized_as_string() {
        let insert = InsertMarketListing::validate(&json!({
            "title": "Novilhas", "category": "gado", "price": 3200.5
        }))
        .unwrap();
        let listing = MarketListing::new(Uuid::new_v4(), Uuid::new_v4(), insert, Utc::now());
        let v = serde_json::to_value(&listing).unwrap();
        assert_eq!(v["price"], "3200.50");
        assert_eq!(v["isActive"], true);
    }
}
