use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::reminder::select_today;
use crate::database::models::{
    Animal, AnimalPatch, GpsRoute, InsertAnimal, InsertGpsRoute, InsertMarketListing, InsertNote,
    InsertReminder, InsertVaccination, MarketListing, MarketListingPatch, Note, NotePatch,
    Reminder, ReminderPatch, TodayWindow, UpsertUser, User, Vaccination,
};
use crate::database::store::{Store, StoreError};
use crate::types::EntityKind;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    animals: HashMap<Uuid, Animal>,
    vaccinations: HashMap<Uuid, Vaccination>,
    reminders: HashMap<Uuid, Reminder>,
    notes: HashMap<Uuid, Note>,
    listings: HashMap<Uuid, MarketListing>,
    routes: HashMap<Uuid, GpsRoute>,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    /// Wall clock, forced strictly forward so writes never share a timestamp.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(now);
        now
    }

    fn require_user(&self, owner: Uuid, table: &str) -> Result<(), StoreError> {
        if self.users.contains_key(&owner) {
            Ok(())
        } else {
            Err(StoreError::Persistence(format!(
                "insert into {} references unknown user {}",
                table, owner
            )))
        }
    }

    fn owned_animal(&self, owner: Uuid, id: Uuid) -> Option<&Animal> {
        self.animals.get(&id).filter(|a| a.user_id == owner)
    }
}

/// In-process store with the same contract as the PostgreSQL one.
///
/// Used by the integration tests and when the server runs without
/// `DATABASE_URL`. Foreign keys and the animal → vaccination cascade are
/// emulated; everything lives behind a single lock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned<T: Clone>(
    map: &HashMap<Uuid, T>,
    id: Uuid,
    owner: Uuid,
    user_of: impl Fn(&T) -> Uuid,
) -> Option<T> {
    map.get(&id).filter(|r| user_of(r) == owner).cloned()
}

fn list_owned<T: Clone>(
    map: &HashMap<Uuid, T>,
    owner: Uuid,
    user_of: impl Fn(&T) -> Uuid,
) -> Vec<T> {
    map.values().filter(|r| user_of(r) == owner).cloned().collect()
}

fn remove_owned<T>(
    map: &mut HashMap<Uuid, T>,
    id: Uuid,
    owner: Uuid,
    user_of: impl Fn(&T) -> Uuid,
) {
    if map.get(&id).map(|r| user_of(r) == owner).unwrap_or(false) {
        map.remove(&id);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, upsert: UpsertUser) -> Result<User, StoreError> {
        let mut t = self.tables.write().await;
        if let Some(email) = upsert.email.as_deref() {
            let taken = t
                .users
                .values()
                .any(|u| u.id != upsert.id && u.email.as_deref() == Some(email));
            if taken {
                return Err(StoreError::Persistence(format!(
                    "email {} already belongs to another user",
                    email
                )));
            }
        }
        let now = t.tick();
        let user = match t.users.get_mut(&upsert.id) {
            Some(existing) => {
                existing.refresh(upsert, now);
                existing.clone()
            }
            None => {
                let user = User::from_upsert(upsert, now);
                t.users.insert(user.id, user.clone());
                user
            }
        };
        Ok(user)
    }

    async fn list_animals(&self, owner: Uuid) -> Result<Vec<Animal>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = list_owned(&t.animals, owner, |a| a.user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_animal(&self, owner: Uuid, id: Uuid) -> Result<Option<Animal>, StoreError> {
        let t = self.tables.read().await;
        Ok(owned(&t.animals, id, owner, |a| a.user_id))
    }

    async fn create_animal(&self, owner: Uuid, insert: InsertAnimal) -> Result<Animal, StoreError> {
        let mut t = self.tables.write().await;
        t.require_user(owner, "animals")?;
        let now = t.tick();
        let animal = Animal::new(Uuid::new_v4(), owner, insert, now);
        t.animals.insert(animal.id, animal.clone());
        Ok(animal)
    }

    async fn update_animal(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: AnimalPatch,
    ) -> Result<Animal, StoreError> {
        let mut t = self.tables.write().await;
        let now = t.tick();
        let animal = t
            .animals
            .get_mut(&id)
            .filter(|a| a.user_id == owner)
            .ok_or(StoreError::NotFound(EntityKind::Animal))?;
        patch.apply(animal);
        animal.updated_at = now;
        Ok(animal.clone())
    }

    async fn delete_animal(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        if t.owned_animal(owner, id).is_some() {
            t.animals.remove(&id);
            t.vaccinations.retain(|_, v| v.animal_id != id);
        }
        Ok(())
    }

    async fn list_vaccinations(
        &self,
        owner: Uuid,
        animal_id: Uuid,
    ) -> Result<Vec<Vaccination>, StoreError> {
        let t = self.tables.read().await;
        if t.owned_animal(owner, animal_id).is_none() {
            return Err(StoreError::NotFound(EntityKind::Animal));
        }
        let mut rows: Vec<Vaccination> = t
            .vaccinations
            .values()
            .filter(|v| v.animal_id == animal_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.application_date
                .cmp(&a.application_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn create_vaccination(
        &self,
        owner: Uuid,
        insert: InsertVaccination,
    ) -> Result<Vaccination, StoreError> {
        let mut t = self.tables.write().await;
        if t.owned_animal(owner, insert.animal_id).is_none() {
            return Err(StoreError::NotFound(EntityKind::Animal));
        }
        let now = t.tick();
        let vaccination = Vaccination::new(Uuid::new_v4(), insert, now);
        t.vaccinations.insert(vaccination.id, vaccination.clone());
        Ok(vaccination)
    }

    async fn delete_vaccination(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        let visible = t
            .vaccinations
            .get(&id)
            .map(|v| t.owned_animal(owner, v.animal_id).is_some())
            .unwrap_or(false);
        if visible {
            t.vaccinations.remove(&id);
        }
        Ok(())
    }

    async fn list_reminders(&self, owner: Uuid) -> Result<Vec<Reminder>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = list_owned(&t.reminders, owner, |r| r.user_id);
        rows.sort_by(|a, b| {
            b.reminder_date
                .cmp(&a.reminder_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn today_reminders(
        &self,
        owner: Uuid,
        window: TodayWindow,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<Reminder>, StoreError> {
        let t = self.tables.read().await;
        Ok(select_today(list_owned(&t.reminders, owner, |r| r.user_id), window, now))
    }

    async fn get_reminder(&self, owner: Uuid, id: Uuid) -> Result<Option<Reminder>, StoreError> {
        let t = self.tables.read().await;
        Ok(owned(&t.reminders, id, owner, |r| r.user_id))
    }

    async fn create_reminder(
        &self,
        owner: Uuid,
        insert: InsertReminder,
    ) -> Result<Reminder, StoreError> {
        let mut t = self.tables.write().await;
        t.require_user(owner, "reminders")?;
        let now = t.tick();
        let reminder = Reminder::new(Uuid::new_v4(), owner, insert, now);
        t.reminders.insert(reminder.id, reminder.clone());
        Ok(reminder)
    }

    async fn update_reminder(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> Result<Reminder, StoreError> {
        let mut t = self.tables.write().await;
        let now = t.tick();
        let reminder = t
            .reminders
            .get_mut(&id)
            .filter(|r| r.user_id == owner)
            .ok_or(StoreError::NotFound(EntityKind::Reminder))?;
        patch.apply(reminder);
        reminder.updated_at = now;
        Ok(reminder.clone())
    }

    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        remove_owned(&mut t.reminders, id, owner, |r| r.user_id);
        Ok(())
    }

    async fn list_notes(&self, owner: Uuid) -> Result<Vec<Note>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = list_owned(&t.notes, owner, |n| n.user_id);
        rows.sort_by(|a, b| {
            b.note_date
                .cmp(&a.note_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn get_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let t = self.tables.read().await;
        Ok(owned(&t.notes, id, owner, |n| n.user_id))
    }

    async fn create_note(&self, owner: Uuid, insert: InsertNote) -> Result<Note, StoreError> {
        let mut t = self.tables.write().await;
        t.require_user(owner, "notes")?;
        let now = t.tick();
        let note = Note::new(Uuid::new_v4(), owner, insert, now);
        t.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Note, StoreError> {
        let mut t = self.tables.write().await;
        let now = t.tick();
        let note = t
            .notes
            .get_mut(&id)
            .filter(|n| n.user_id == owner)
            .ok_or(StoreError::NotFound(EntityKind::Note))?;
        patch.apply(note);
        note.updated_at = now;
        Ok(note.clone())
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        remove_owned(&mut t.notes, id, owner, |n| n.user_id);
        Ok(())
    }

    async fn list_public_listings(&self) -> Result<Vec<MarketListing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows: Vec<MarketListing> =
            t.listings.values().filter(|l| l.is_active).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_listings(&self, owner: Uuid) -> Result<Vec<MarketListing>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = list_owned(&t.listings, owner, |l| l.user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_listing(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<MarketListing>, StoreError> {
        let t = self.tables.read().await;
        Ok(owned(&t.listings, id, owner, |l| l.user_id))
    }

    async fn create_listing(
        &self,
        owner: Uuid,
        insert: InsertMarketListing,
    ) -> Result<MarketListing, StoreError> {
        let mut t = self.tables.write().await;
        t.require_user(owner, "market_listings")?;
        let now = t.tick();
        let listing = MarketListing::new(Uuid::new_v4(), owner, insert, now);
        t.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn update_listing(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MarketListingPatch,
    ) -> Result<MarketListing, StoreError> {
        let mut t = self.tables.write().await;
        let now = t.tick();
        let listing = t
            .listings
            .get_mut(&id)
            .filter(|l| l.user_id == owner)
            .ok_or(StoreError::NotFound(EntityKind::MarketListing))?;
        patch.apply(listing);
        listing.updated_at = now;
        Ok(listing.clone())
    }

    async fn delete_listing(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        remove_owned(&mut t.listings, id, owner, |l| l.user_id);
        Ok(())
    }

    async fn list_routes(&self, owner: Uuid) -> Result<Vec<GpsRoute>, StoreError> {
        let t = self.tables.read().await;
        let mut rows = list_owned(&t.routes, owner, |r| r.user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_route(&self, owner: Uuid, id: Uuid) -> Result<Option<GpsRoute>, StoreError> {
        let t = self.tables.read().await;
        Ok(owned(&t.routes, id, owner, |r| r.user_id))
    }

    async fn create_route(
        &self,
        owner: Uuid,
        insert: InsertGpsRoute,
    ) -> Result<GpsRoute, StoreError> {
        let mut t = self.tables.write().await;
        t.require_user(owner, "gps_routes")?;
        let now = t.tick();
        let route = GpsRoute::new(Uuid::new_v4(), owner, insert, now);
        t.routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn delete_route(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        remove_owned(&mut t.routes, id, owner, |r| r.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::InsertShape;
    use serde_json::json;

    // Shared store behavior is covered by tests/35_store_contract.rs

    #[test]
    fn ticks_never_repeat() {
        let mut tables = Tables::default();
        let first = tables.tick();
        let second = tables.tick();
        let third = tables.tick();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn deleting_an_animal_drops_its_vaccination_rows() {
        let store = MemoryStore::new();
        let owner = store
            .upsert_user(UpsertUser { id: Uuid::new_v4(), ..Default::default() })
            .await
            .unwrap()
            .id;
        let insert = InsertAnimal::validate(&json!({ "type": "vaca", "name": "Mimosa" })).unwrap();
        let a = store.create_animal(owner, insert).await.unwrap();
        let insert = InsertVaccination::validate(&json!({
            "animalId": a.id.to_string(),
            "vaccineName": "Aftosa",
            "applicationDate": "2025-05-01"
        }))
        .unwrap();
        store.create_vaccination(owner, insert).await.unwrap();
        assert_eq!(store.tables.read().await.vaccinations.len(), 1);

        store.delete_animal(owner, a.id).await.unwrap();
        assert!(store.tables.read().await.vaccinations.is_empty());
    }
}
