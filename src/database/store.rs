use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    Animal, AnimalPatch, GpsRoute, InsertAnimal, InsertGpsRoute, InsertMarketListing, InsertNote,
    InsertReminder, InsertVaccination, MarketListing, MarketListingPatch, Note, NotePatch,
    Reminder, ReminderPatch, TodayWindow, UpsertUser, User, Vaccination,
};
use crate::types::EntityKind;

/// Errors surfaced by a [`Store`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .0.label())]
    NotFound(EntityKind),

    /// The store rejected the write (constraint violation, unknown owner, ...)
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owner-scoped storage gateway.
///
/// Every read and write takes the authenticated user's id; records owned by
/// anybody else behave as if they did not exist. Deletes are idempotent.
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    // Users
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn upsert_user(&self, user: UpsertUser) -> Result<User, StoreError>;

    // Animals, newest first
    async fn list_animals(&self, owner: Uuid) -> Result<Vec<Animal>, StoreError>;
    async fn get_animal(&self, owner: Uuid, id: Uuid) -> Result<Option<Animal>, StoreError>;
    async fn create_animal(&self, owner: Uuid, insert: InsertAnimal) -> Result<Animal, StoreError>;
    async fn update_animal(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: AnimalPatch,
    ) -> Result<Animal, StoreError>;
    async fn delete_animal(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // Vaccinations, scoped through the parent animal
    async fn list_vaccinations(
        &self,
        owner: Uuid,
        animal_id: Uuid,
    ) -> Result<Vec<Vaccination>, StoreError>;
    async fn create_vaccination(
        &self,
        owner: Uuid,
        insert: InsertVaccination,
    ) -> Result<Vaccination, StoreError>;
    async fn delete_vaccination(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // Reminders, latest reminderDate first
    async fn list_reminders(&self, owner: Uuid) -> Result<Vec<Reminder>, StoreError>;
    async fn today_reminders(
        &self,
        owner: Uuid,
        window: TodayWindow,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<Reminder>, StoreError>;
    async fn get_reminder(&self, owner: Uuid, id: Uuid) -> Result<Option<Reminder>, StoreError>;
    async fn create_reminder(
        &self,
        owner: Uuid,
        insert: InsertReminder,
    ) -> Result<Reminder, StoreError>;
    async fn update_reminder(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> Result<Reminder, StoreError>;
    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // Notes, latest noteDate first
    async fn list_notes(&self, owner: Uuid) -> Result<Vec<Note>, StoreError>;
    async fn get_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, StoreError>;
    async fn create_note(&self, owner: Uuid, insert: InsertNote) -> Result<Note, StoreError>;
    async fn update_note(&self, owner: Uuid, id: Uuid, patch: NotePatch)
        -> Result<Note, StoreError>;
    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // Market listings
    /// Active listings from every user, newest first
    async fn list_public_listings(&self) -> Result<Vec<MarketListing>, StoreError>;
    async fn list_listings(&self, owner: Uuid) -> Result<Vec<MarketListing>, StoreError>;
    async fn get_listing(&self, owner: Uuid, id: Uuid)
        -> Result<Option<MarketListing>, StoreError>;
    async fn create_listing(
        &self,
        owner: Uuid,
        insert: InsertMarketListing,
    ) -> Result<MarketListing, StoreError>;
    async fn update_listing(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MarketListingPatch,
    ) -> Result<MarketListing, StoreError>;
    async fn delete_listing(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // GPS routes, newest first
    async fn list_routes(&self, owner: Uuid) -> Result<Vec<GpsRoute>, StoreError>;
    async fn get_route(&self, owner: Uuid, id: Uuid) -> Result<Option<GpsRoute>, StoreError>;
    async fn create_route(
        &self,
        owner: Uuid,
        insert: InsertGpsRoute,
    ) -> Result<GpsRoute, StoreError>;
    async fn delete_route(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;
}
