use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-text categories that share the `(entry, time)` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCategory {
    Journal,
    Exercise,
    Symptoms,
}

impl EntryCategory {
    pub fn table(&self) -> &'static str {
        match self {
            EntryCategory::Journal => "journal",
            EntryCategory::Exercise => "exercise",
            EntryCategory::Symptoms => "symptoms",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "journal" => Some(EntryCategory::Journal),
            "exercise" => Some(EntryCategory::Exercise),
            "symptoms" => Some(EntryCategory::Symptoms),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub entry: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reminder {
    pub id: i64,
    pub entry: String,
    pub reminder_time: DateTime<Utc>,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyFocus {
    pub id: i64,
    pub entry: String,
    pub reminder_time: DateTime<Utc>,
    pub time: DateTime<Utc>,
}
