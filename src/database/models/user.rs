use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Role on the farm (produtor, veterinário, ...)
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity-provider profile, inserted or refreshed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub role: Option<String>,
}

impl User {
    pub fn from_upsert(upsert: UpsertUser, now: DateTime<Utc>) -> Self {
        Self {
            id: upsert.id,
            email: upsert.email,
            first_name: upsert.first_name,
            last_name: upsert.last_name,
            profile_image_url: upsert.profile_image_url,
            birth_date: upsert.birth_date,
            role: upsert.role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite profile fields, keeping id and creation time.
    pub fn refresh(&mut self, upsert: UpsertUser, now: DateTime<Utc>) {
        self.email = upsert.email;
        self.first_name = upsert.first_name;
        self.last_name = upsert.last_name;
        self.profile_image_url = upsert.profile_image_url;
        self.birth_date = upsert.birth_date;
        self.role = upsert.role;
        self.updated_at = now;
    }
}
