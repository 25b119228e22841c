pub mod animal;
pub mod gps_route;
pub mod market_listing;
pub mod note;
pub mod reminder;
pub mod user;
pub mod vaccination;

pub use animal::{Animal, AnimalPatch, InsertAnimal};
pub use gps_route::{GpsRoute, InsertGpsRoute};
pub use market_listing::{InsertMarketListing, MarketListing, MarketListingPatch};
pub use note::{InsertNote, Note, NotePatch};
pub use reminder::{InsertReminder, Reminder, ReminderPatch, TodayWindow};
pub use user::{UpsertUser, User};
pub use vaccination::{InsertVaccination, Vaccination};
