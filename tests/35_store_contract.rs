//! Behavior every `Store` must share, run against the in-memory store and,
//! when `DATABASE_URL` is set, against PostgreSQL.

use anyhow::{ensure, Result};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use agrobagual_api::config::AppConfig;
use agrobagual_api::database::models::{
    AnimalPatch, InsertAnimal, InsertMarketListing, InsertNote, InsertReminder, InsertVaccination,
    MarketListingPatch, Reminder, ReminderPatch, TodayWindow, UpsertUser,
};
use agrobagual_api::database::{DatabaseManager, MemoryStore, PgStore, Store, StoreError};
use agrobagual_api::types::EntityKind;
use agrobagual_api::validation::InsertShape;

async fn new_user(store: &dyn Store) -> Result<Uuid> {
    let id = Uuid::new_v4();
    store
        .upsert_user(UpsertUser {
            id,
            email: Some(format!("{}@fazenda.test", id)),
            ..UpsertUser::default()
        })
        .await?;
    Ok(id)
}

fn animal(name: &str) -> Result<InsertAnimal> {
    Ok(InsertAnimal::validate(&json!({ "type": "vaca", "name": name }))?)
}

fn reminder(body: Value) -> Result<InsertReminder> {
    Ok(InsertReminder::validate(&body)?)
}

fn utc(at: &str) -> Result<DateTime<FixedOffset>> {
    Ok(DateTime::parse_from_rfc3339(at)?)
}

async fn unknown_owner_is_rejected(store: &dyn Store) -> Result<()> {
    let err = store.create_animal(Uuid::new_v4(), animal("Mimosa")?).await.err();
    ensure!(matches!(err, Some(StoreError::Persistence(_))), "got {:?}", err);
    Ok(())
}

async fn duplicate_email_is_rejected(store: &dyn Store) -> Result<()> {
    let email = Some(format!("{}@fazenda.test", Uuid::new_v4()));
    let user = |email: Option<String>| UpsertUser {
        id: Uuid::new_v4(),
        email,
        ..UpsertUser::default()
    };
    store.upsert_user(user(email.clone())).await?;
    let err = store.upsert_user(user(email)).await.err();
    ensure!(matches!(err, Some(StoreError::Persistence(_))), "got {:?}", err);
    Ok(())
}

async fn upsert_refreshes_profile(store: &dyn Store) -> Result<()> {
    let id = new_user(store).await?;
    let before = store.get_user(id).await?.expect("user exists");
    let after = store
        .upsert_user(UpsertUser {
            id,
            email: before.email.clone(),
            role: Some("produtor".to_string()),
            ..UpsertUser::default()
        })
        .await?;
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.role.as_deref(), Some("produtor"));
    Ok(())
}

async fn other_users_records_are_invisible(store: &dyn Store) -> Result<()> {
    let alice = new_user(store).await?;
    let bob = new_user(store).await?;

    let a = store.create_animal(alice, animal("Estrela")?).await?;
    assert!(store.list_animals(bob).await?.is_empty());
    assert!(store.get_animal(bob, a.id).await?.is_none());
    let err = store.update_animal(bob, a.id, AnimalPatch::default()).await.err();
    assert!(matches!(err, Some(StoreError::NotFound(EntityKind::Animal))));

    store.delete_animal(bob, a.id).await?;
    assert!(store.get_animal(alice, a.id).await?.is_some());
    Ok(())
}

async fn update_keeps_identity(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    let created = store.create_animal(owner, animal("Mimosa")?).await?;
    let patch = AnimalPatch::validate(&json!({ "name": "Mimosa II" }))?;
    let updated = store.update_animal(owner, created.id, patch).await?;

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.user_id, owner);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.name, "Mimosa II");
    assert_eq!(updated.kind, "vaca");

    let again = store.update_animal(owner, created.id, AnimalPatch::default()).await?;
    assert!(again.updated_at > updated.updated_at);
    Ok(())
}

async fn vaccinations_are_scoped_by_animal_owner(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    let stranger = new_user(store).await?;
    let a = store.create_animal(owner, animal("Mimosa")?).await?;

    let vaccination = |name: &str, date: &str| {
        InsertVaccination::validate(&json!({
            "animalId": a.id.to_string(),
            "vaccineName": name,
            "applicationDate": date
        }))
    };
    store.create_vaccination(owner, vaccination("Aftosa", "2025-05-01")?).await?;
    let latest = store.create_vaccination(owner, vaccination("Brucelose", "2025-06-01")?).await?;

    let err = store.create_vaccination(stranger, vaccination("Raiva", "2025-07-01")?).await.err();
    assert!(matches!(err, Some(StoreError::NotFound(EntityKind::Animal))));
    let err = store.list_vaccinations(stranger, a.id).await.err();
    assert!(matches!(err, Some(StoreError::NotFound(EntityKind::Animal))));

    // A stranger's delete is a silent no-op
    store.delete_vaccination(stranger, latest.id).await?;
    let names: Vec<_> = store
        .list_vaccinations(owner, a.id)
        .await?
        .into_iter()
        .map(|v| v.vaccine_name)
        .collect();
    assert_eq!(names, ["Brucelose", "Aftosa"]);

    store.delete_vaccination(owner, latest.id).await?;
    assert_eq!(store.list_vaccinations(owner, a.id).await?.len(), 1);

    store.delete_animal(owner, a.id).await?;
    let err = store.list_vaccinations(owner, a.id).await.err();
    assert!(matches!(err, Some(StoreError::NotFound(EntityKind::Animal))));
    Ok(())
}

async fn deletes_are_idempotent(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    let a = store.create_animal(owner, animal("Mimosa")?).await?;
    store.delete_animal(owner, a.id).await?;
    store.delete_animal(owner, a.id).await?;
    store.delete_note(owner, Uuid::new_v4()).await?;
    store.delete_reminder(owner, Uuid::new_v4()).await?;
    store.delete_listing(owner, Uuid::new_v4()).await?;
    store.delete_route(owner, Uuid::new_v4()).await?;
    assert!(store.get_animal(owner, a.id).await?.is_none());
    Ok(())
}

async fn today_reminders_order_and_window(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    for (title, urgent, at) in [
        ("R1", true, "2025-06-10T14:00:00Z"),
        ("R2", false, "2025-06-10T09:00:00Z"),
        ("R3", true, "2025-06-10T08:00:00Z"),
        ("later", false, "2025-06-12T08:00:00Z"),
    ] {
        let insert = reminder(json!({
            "title": title, "category": "plantio", "isUrgent": urgent, "reminderDate": at
        }))?;
        store.create_reminder(owner, insert).await?;
    }
    let done = store
        .create_reminder(
            owner,
            reminder(json!({
                "title": "feito", "category": "plantio", "isUrgent": true,
                "reminderDate": "2025-06-10T07:00:00Z"
            }))?,
        )
        .await?;
    let patch = ReminderPatch::validate(&json!({ "isCompleted": true }))?;
    store.update_reminder(owner, done.id, patch).await?;

    let titles = |rows: Vec<Reminder>| rows.into_iter().map(|r| r.title).collect::<Vec<_>>();
    let now = utc("2025-06-10T12:00:00Z")?;
    let day = store.today_reminders(owner, TodayWindow::CalendarDay, now).await?;
    assert_eq!(titles(day), ["R3", "R1", "R2"]);
    let all = store.today_reminders(owner, TodayWindow::AllPending, now).await?;
    assert_eq!(titles(all), ["R3", "R1", "R2", "later"]);

    let listed = store.list_reminders(owner).await?;
    assert_eq!(listed.first().map(|r| r.title.as_str()), Some("later"));
    Ok(())
}

// 01:00 UTC on the 11th is still the evening of the 10th in Brasília
async fn calendar_day_follows_the_offset(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    for (title, at) in [("noite", "2025-06-11T01:00:00Z"), ("madrugada", "2025-06-10T02:00:00Z")] {
        let insert =
            reminder(json!({ "title": title, "category": "pecuária", "reminderDate": at }))?;
        store.create_reminder(owner, insert).await?;
    }

    let brasilia = FixedOffset::west_opt(3 * 3600).expect("valid offset");
    let now = Utc.with_ymd_and_hms(2025, 6, 10, 15, 0, 0).unwrap().with_timezone(&brasilia);
    let titles: Vec<_> = store
        .today_reminders(owner, TodayWindow::CalendarDay, now)
        .await?
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, ["noite"]);
    Ok(())
}

async fn notes_list_by_note_date(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    for (title, at) in [("antiga", "2024-12-01T07:00:00Z"), ("recente", "2025-02-01T07:00:00Z")] {
        let insert = InsertNote::validate(&json!({ "title": title, "noteDate": at }))?;
        store.create_note(owner, insert).await?;
    }
    let titles: Vec<_> = store.list_notes(owner).await?.into_iter().map(|n| n.title).collect();
    assert_eq!(titles, ["recente", "antiga"]);
    Ok(())
}

async fn inactive_listings_stay_off_the_feed(store: &dyn Store) -> Result<()> {
    let owner = new_user(store).await?;
    let listing = |body: Value| InsertMarketListing::validate(&body);
    let active = store
        .create_listing(owner, listing(json!({ "title": "Trator", "category": "equipamentos" }))?)
        .await?;
    let hidden = store
        .create_listing(
            owner,
            listing(json!({ "title": "Milho", "category": "insumos", "isActive": false }))?,
        )
        .await?;

    let feed: Vec<Uuid> = store.list_public_listings().await?.into_iter().map(|l| l.id).collect();
    assert!(feed.contains(&active.id));
    assert!(!feed.contains(&hidden.id));

    let mine: Vec<Uuid> = store.list_listings(owner).await?.into_iter().map(|l| l.id).collect();
    assert_eq!(mine, [hidden.id, active.id]);

    let patch = MarketListingPatch::validate(&json!({ "isActive": false }))?;
    store.update_listing(owner, active.id, patch).await?;
    let feed: Vec<Uuid> = store.list_public_listings().await?.into_iter().map(|l| l.id).collect();
    assert!(!feed.contains(&active.id));
    Ok(())
}

async fn run_contract(store: &dyn Store) -> Result<()> {
    store.health_check().await?;
    unknown_owner_is_rejected(store).await?;
    duplicate_email_is_rejected(store).await?;
    upsert_refreshes_profile(store).await?;
    other_users_records_are_invisible(store).await?;
    update_keeps_identity(store).await?;
    vaccinations_are_scoped_by_animal_owner(store).await?;
    deletes_are_idempotent(store).await?;
    today_reminders_order_and_window(store).await?;
    calendar_day_follows_the_offset(store).await?;
    notes_list_by_note_date(store).await?;
    inactive_listings_stay_off_the_feed(store).await?;
    Ok(())
}

#[tokio::test]
async fn memory_store_contract() -> Result<()> {
    run_contract(&MemoryStore::new()).await
}

#[tokio::test]
async fn postgres_store_contract() -> Result<()> {
    let _ = dotenvy::dotenv();
    let mut database = AppConfig::development().database;
    database.url = match std::env::var("DATABASE_URL") {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL store contract");
            return Ok(());
        }
    };
    database.run_migrations = true;

    let pool = DatabaseManager::connect(&database).await?;
    run_contract(&PgStore::new(pool)).await
}
