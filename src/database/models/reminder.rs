use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::cmp::Ordering;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::{FieldReader, InsertShape, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// plantio, serviço, colheita, pecuária
    pub category: String,
    pub is_urgent: bool,
    pub reminder_date: DateTime<Utc>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reminder {
    pub fn new(id: Uuid, owner: Uuid, insert: InsertReminder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: owner,
            title: insert.title,
            description: insert.description,
            category: insert.category,
            is_urgent: insert.is_urgent,
            reminder_date: insert.reminder_date,
            is_completed: insert.is_completed,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertReminder {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub is_urgent: bool,
    pub reminder_date: DateTime<Utc>,
    pub is_completed: bool,
}

impl InsertShape for InsertReminder {
    fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let title = r.required_string("title");
        let description = r.optional_string("description");
        let category = r.required_string("category");
        let is_urgent = r.optional_bool("isUrgent");
        let reminder_date = r.required_timestamp("reminderDate");
        let is_completed = r.optional_bool("isCompleted");
        r.finish()?;

        Ok(Self {
            title: title.unwrap_or_default(),
            description,
            category: category.unwrap_or_default(),
            is_urgent: is_urgent.unwrap_or(false),
            reminder_date: reminder_date.unwrap_or_default(),
            is_completed: is_completed.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub is_urgent: Option<bool>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub is_completed: Option<bool>,
}

impl ReminderPatch {
    pub fn validate(raw: &Value) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(raw)?;
        let patch = Self {
            title: r.patch_required_string("title"),
            description: r.patch_string("description"),
            category: r.patch_required_string("category"),
            is_urgent: r.patch_bool("isUrgent"),
            reminder_date: r.patch_required_timestamp("reminderDate"),
            is_completed: r.patch_bool("isCompleted"),
        };
        r.finish()?;
        Ok(patch)
    }

    pub fn apply(self, reminder: &mut Reminder) {
        if let Some(v) = self.title {
            reminder.title = v;
        }
        if let Some(v) = self.description {
            reminder.description = v;
        }
        if let Some(v) = self.category {
            reminder.category = v;
        }
        if let Some(v) = self.is_urgent {
            reminder.is_urgent = v;
        }
        if let Some(v) = self.reminder_date {
            reminder.reminder_date = v;
        }
        if let Some(v) = self.is_completed {
            reminder.is_completed = v;
        }
    }
}

/// Which pending reminders count as "today"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodayWindow {
    /// Every incomplete reminder, whatever its date
    #[default]
    AllPending,
    /// Incomplete reminders dated within the current local day, measured in
    /// the offset carried by `now`
    CalendarDay,
}

impl TodayWindow {
    /// Half-open `[start, end)` bounds in UTC, if this window filters by date
    pub fn bounds(&self, now: DateTime<FixedOffset>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            TodayWindow::AllPending => None,
            TodayWindow::CalendarDay => {
                let midnight = now.date_naive().and_hms_opt(0, 0, 0)?;
                let start = now.offset().from_local_datetime(&midnight).single()?;
                let start = start.with_timezone(&Utc);
                Some((start, start + Duration::days(1)))
            }
        }
    }

    pub fn contains(&self, reminder_date: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
        match self.bounds(now) {
            None => true,
            Some((start, end)) => reminder_date >= start && reminder_date < end,
        }
    }
}

impl FromStr for TodayWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all_pending" | "all" => Ok(TodayWindow::AllPending),
            "calendar_day" | "day" => Ok(TodayWindow::CalendarDay),
            other => Err(format!("unknown today window '{}'", other)),
        }
    }
}

/// Urgent first, then earliest `reminderDate`; creation time breaks ties.
pub fn today_order(a: &Reminder, b: &Reminder) -> Ordering {
    b.is_urgent
        .cmp(&a.is_urgent)
        .then_with(|| a.reminder_date.cmp(&b.reminder_date))
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Apply the today-reminders rule to one user's reminders.
pub fn select_today<I>(
    reminders: I,
    window: TodayWindow,
    now: DateTime<FixedOffset>,
) -> Vec<Reminder>
where
    I: IntoIterator<Item = Reminder>,
{
    let mut selected: Vec<Reminder> = reminders
        .into_iter()
        .filter(|r| !r.is_completed && window.contains(r.reminder_date, now))
        .collect();
    selected.sort_by(today_order);
    selected
}
