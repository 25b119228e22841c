/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity kinds that accept client-supplied insert payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Animal,
    Vaccination,
    Reminder,
    Note,
    MarketListing,
    GpsRoute,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Animal,
        EntityKind::Vaccination,
        EntityKind::Reminder,
        EntityKind::Note,
        EntityKind::MarketListing,
        EntityKind::GpsRoute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Animal => "animal",
            EntityKind::Vaccination => "vaccination",
            EntityKind::Reminder => "reminder",
            EntityKind::Note => "note",
            EntityKind::MarketListing => "market_listing",
            EntityKind::GpsRoute => "gps_route",
        }
    }

    /// Human label used in not-found messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Animal => "Animal",
            EntityKind::Vaccination => "Vaccination",
            EntityKind::Reminder => "Reminder",
            EntityKind::Note => "Note",
            EntityKind::MarketListing => "Market listing",
            EntityKind::GpsRoute => "GPS route",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "animal" | "animals" => Ok(EntityKind::Animal),
            "vaccination" | "vaccinations" => Ok(EntityKind::Vaccination),
            "reminder" | "reminders" => Ok(EntityKind::Reminder),
            "note" | "notes" => Ok(EntityKind::Note),
            "market_listing" | "market_listings" | "listing" | "listings" => {
                Ok(EntityKind::MarketListing)
            }
            "gps_route" | "gps_routes" | "route" | "routes" => Ok(EntityKind::GpsRoute),
            other => Err(format!(
                "unknown entity kind '{}' (expected one of: {})",
                other,
                EntityKind::ALL
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
