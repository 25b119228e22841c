use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{
    Animal, AnimalPatch, GpsRoute, InsertAnimal, InsertGpsRoute, InsertMarketListing, InsertNote,
    InsertReminder, InsertVaccination, MarketListing, MarketListingPatch, Note, NotePatch,
    Reminder, ReminderPatch, TodayWindow, UpsertUser, User, Vaccination,
};
use crate::database::store::{Store, StoreError};
use crate::types::EntityKind;

/// Bumps `updated_at` to now while never moving it backwards
const TOUCH: &str = "updated_at = GREATEST(now(), updated_at + interval '1 microsecond')";

/// PostgreSQL-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Constraint violations on write are the caller's problem, not a crash.
fn write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db)
            if db.is_foreign_key_violation()
                || db.is_unique_violation()
                || db.is_check_violation() =>
        {
            StoreError::Persistence(db.message().to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn upsert_user(&self, user: UpsertUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url, birth_date, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                birth_date = EXCLUDED.birth_date,
                role = EXCLUDED.role,
                updated_at = GREATEST(now(), users.updated_at + interval '1 microsecond')
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.profile_image_url)
        .bind(user.birth_date)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    // Animals

    async fn list_animals(&self, owner: Uuid) -> Result<Vec<Animal>, StoreError> {
        let rows = sqlx::query_as::<_, Animal>(
            "SELECT * FROM animals WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_animal(&self, owner: Uuid, id: Uuid) -> Result<Option<Animal>, StoreError> {
        let row = sqlx::query_as::<_, Animal>(
            "SELECT * FROM animals WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_animal(&self, owner: Uuid, insert: InsertAnimal) -> Result<Animal, StoreError> {
        sqlx::query_as::<_, Animal>(
            r#"
            INSERT INTO animals (id, user_id, "type", breed, name, description, weight,
                daily_milk_production, monthly_milk_production, category, photo_url, birth_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(insert.kind)
        .bind(insert.breed)
        .bind(insert.name)
        .bind(insert.description)
        .bind(insert.weight)
        .bind(insert.daily_milk_production)
        .bind(insert.monthly_milk_production)
        .bind(insert.category)
        .bind(insert.photo_url)
        .bind(insert.birth_date)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    async fn update_animal(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: AnimalPatch,
    ) -> Result<Animal, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut animal = sqlx::query_as::<_, Animal>(
            "SELECT * FROM animals WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Animal))?;

        patch.apply(&mut animal);

        let sql = format!(
            r#"
            UPDATE animals SET "type" = $2, breed = $3, name = $4, description = $5, weight = $6,
                daily_milk_production = $7, monthly_milk_production = $8, category = $9,
                photo_url = $10, birth_date = $11, {TOUCH}
            WHERE id = $1
            RETURNING *
            "#
        );
        let updated = sqlx::query_as::<_, Animal>(&sql)
            .bind(animal.id)
            .bind(animal.kind)
            .bind(animal.breed)
            .bind(animal.name)
            .bind(animal.description)
            .bind(animal.weight)
            .bind(animal.daily_milk_production)
            .bind(animal.monthly_milk_production)
            .bind(animal.category)
            .bind(animal.photo_url)
            .bind(animal.birth_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_animal(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        // vaccinations go with it through ON DELETE CASCADE
        sqlx::query("DELETE FROM animals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Vaccinations

    async fn list_vaccinations(
        &self,
        owner: Uuid,
        animal_id: Uuid,
    ) -> Result<Vec<Vaccination>, StoreError> {
        if self.get_animal(owner, animal_id).await?.is_none() {
            return Err(StoreError::NotFound(EntityKind::Animal));
        }
        let rows = sqlx::query_as::<_, Vaccination>(
            "SELECT * FROM vaccinations WHERE animal_id = $1 ORDER BY application_date DESC, created_at DESC",
        )
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_vaccination(
        &self,
        owner: Uuid,
        insert: InsertVaccination,
    ) -> Result<Vaccination, StoreError> {
        // Only insert when the parent animal belongs to the caller
        let row = sqlx::query_as::<_, Vaccination>(
            r#"
            INSERT INTO vaccinations (id, animal_id, vaccine_name, application_date,
                next_due_date, quarantine_days, notes)
            SELECT $1, a.id, $3, $4, $5, $6, $7
            FROM animals a
            WHERE a.id = $2 AND a.user_id = $8
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(insert.animal_id)
        .bind(insert.vaccine_name)
        .bind(insert.application_date)
        .bind(insert.next_due_date)
        .bind(insert.quarantine_days)
        .bind(insert.notes)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_error)?;
        row.ok_or(StoreError::NotFound(EntityKind::Animal))
    }

    async fn delete_vaccination(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            DELETE FROM vaccinations v
            USING animals a
            WHERE v.id = $1 AND v.animal_id = a.id AND a.user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Reminders

    async fn list_reminders(&self, owner: Uuid) -> Result<Vec<Reminder>, StoreError> {
        let rows = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE user_id = $1 ORDER BY reminder_date DESC, created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn today_reminders(
        &self,
        owner: Uuid,
        window: TodayWindow,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<Reminder>, StoreError> {
        let bounds = window.bounds(now);
        let rows = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT * FROM reminders
            WHERE user_id = $1
              AND is_completed = false
              AND ($2::timestamptz IS NULL OR reminder_date >= $2)
              AND ($3::timestamptz IS NULL OR reminder_date < $3)
            ORDER BY is_urgent DESC, reminder_date ASC, created_at ASC
            "#,
        )
        .bind(owner)
        .bind(bounds.map(|(start, _)| start))
        .bind(bounds.map(|(_, end)| end))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_reminder(&self, owner: Uuid, id: Uuid) -> Result<Option<Reminder>, StoreError> {
        let row = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_reminder(
        &self,
        owner: Uuid,
        insert: InsertReminder,
    ) -> Result<Reminder, StoreError> {
        sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, user_id, title, description, category, is_urgent,
                reminder_date, is_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.category)
        .bind(insert.is_urgent)
        .bind(insert.reminder_date)
        .bind(insert.is_completed)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    async fn update_reminder(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> Result<Reminder, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut reminder = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Reminder))?;

        patch.apply(&mut reminder);

        let sql = format!(
            r#"
            UPDATE reminders SET title = $2, description = $3, category = $4, is_urgent = $5,
                reminder_date = $6, is_completed = $7, {TOUCH}
            WHERE id = $1
            RETURNING *
            "#
        );
        let updated = sqlx::query_as::<_, Reminder>(&sql)
            .bind(reminder.id)
            .bind(reminder.title)
            .bind(reminder.description)
            .bind(reminder.category)
            .bind(reminder.is_urgent)
            .bind(reminder.reminder_date)
            .bind(reminder.is_completed)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_reminder(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Notes

    async fn list_notes(&self, owner: Uuid) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE user_id = $1 ORDER BY note_date DESC, created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_note(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_note(&self, owner: Uuid, insert: InsertNote) -> Result<Note, StoreError> {
        sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (id, user_id, title, description, category, is_urgent, note_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.category)
        .bind(insert.is_urgent)
        .bind(insert.note_date)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    async fn update_note(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: NotePatch,
    ) -> Result<Note, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut note = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::Note))?;

        patch.apply(&mut note);

        let sql = format!(
            r#"
            UPDATE notes SET title = $2, description = $3, category = $4, is_urgent = $5,
                note_date = $6, {TOUCH}
            WHERE id = $1
            RETURNING *
            "#
        );
        let updated = sqlx::query_as::<_, Note>(&sql)
            .bind(note.id)
            .bind(note.title)
            .bind(note.description)
            .bind(note.category)
            .bind(note.is_urgent)
            .bind(note.note_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_note(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // Market listings

    async fn list_public_listings(&self) -> Result<Vec<MarketListing>, StoreError> {
        let rows = sqlx::query_as::<_, MarketListing>(
            "SELECT * FROM market_listings WHERE is_active = true ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_listings(&self, owner: Uuid) -> Result<Vec<MarketListing>, StoreError> {
        let rows = sqlx::query_as::<_, MarketListing>(
            "SELECT * FROM market_listings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_listing(
        &self,
        owner: Uuid,
        id: Uuid,
    ) -> Result<Option<MarketListing>, StoreError> {
        let row = sqlx::query_as::<_, MarketListing>(
            "SELECT * FROM market_listings WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_listing(
        &self,
        owner: Uuid,
        insert: InsertMarketListing,
    ) -> Result<MarketListing, StoreError> {
        sqlx::query_as::<_, MarketListing>(
            r#"
            INSERT INTO market_listings (id, user_id, title, description, category, price,
                condition, location, contact_info, image_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(insert.title)
        .bind(insert.description)
        .bind(insert.category)
        .bind(insert.price)
        .bind(insert.condition)
        .bind(insert.location)
        .bind(insert.contact_info)
        .bind(insert.image_url)
        .bind(insert.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    async fn update_listing(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: MarketListingPatch,
    ) -> Result<MarketListing, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut listing = sqlx::query_as::<_, MarketListing>(
            "SELECT * FROM market_listings WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound(EntityKind::MarketListing))?;

        patch.apply(&mut listing);

        let sql = format!(
            r#"
            UPDATE market_listings SET title = $2, description = $3, category = $4, price = $5,
                condition = $6, location = $7, contact_info = $8, image_url = $9,
                is_active = $10, {TOUCH}
            WHERE id = $1
            RETURNING *
            "#
        );
        let updated = sqlx::query_as::<_, MarketListing>(&sql)
            .bind(listing.id)
            .bind(listing.title)
            .bind(listing.description)
            .bind(listing.category)
            .bind(listing.price)
            .bind(listing.condition)
            .bind(listing.location)
            .bind(listing.contact_info)
            .bind(listing.image_url)
            .bind(listing.is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(write_error)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_listing(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM market_listings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // GPS routes

    async fn list_routes(&self, owner: Uuid) -> Result<Vec<GpsRoute>, StoreError> {
        let rows = sqlx::query_as::<_, GpsRoute>(
            "SELECT * FROM gps_routes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_route(&self, owner: Uuid, id: Uuid) -> Result<Option<GpsRoute>, StoreError> {
        let row = sqlx::query_as::<_, GpsRoute>(
            "SELECT * FROM gps_routes WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_route(
        &self,
        owner: Uuid,
        insert: InsertGpsRoute,
    ) -> Result<GpsRoute, StoreError> {
        sqlx::query_as::<_, GpsRoute>(
            r#"
            INSERT INTO gps_routes (id, user_id, name, description, route_data, area, activity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(insert.name)
        .bind(insert.description)
        .bind(insert.route_data)
        .bind(insert.area)
        .bind(insert.activity)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error)
    }

    async fn delete_route(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM gps_routes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
