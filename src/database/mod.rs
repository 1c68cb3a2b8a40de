pub mod models;
pub mod schema;

use std::path::Path;

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use models::{DailyFocus, Entry, EntryCategory, Reminder};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the SQLite file, creating it and its parent directory if
    /// needed, and ensures the schema exists.
    pub async fn new(path: &str) -> Result<Self, sqlx::Error> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        let db = Database { pool };
        db.create_schema().await?;
        debug!(path, "opened standup database");
        Ok(db)
    }

    /// In-memory database for tests. Capped at one connection so every
    /// query sees the same memory-backed instance.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let db = Database { pool };
        db.create_schema().await?;
        Ok(db)
    }

    async fn create_schema(&self) -> Result<(), sqlx::Error> {
        for table in schema::TABLES {
            sqlx::query(table).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn add_entry(&self, category: EntryCategory, entry: &str) -> Result<(), sqlx::Error> {
        let sql = format!("INSERT INTO {} (entry, time) VALUES (?1, ?2)", category.table());
        sqlx::query(&sql)
            .bind(entry)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_entries(
        &self,
        category: EntryCategory,
        limit: i64,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        let sql = format!(
            "SELECT id, entry, time FROM {} ORDER BY time DESC, id DESC LIMIT ?1",
            category.table()
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn last_exercise_time(&self) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT time FROM exercise ORDER BY time DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn add_reminder(
        &self,
        entry: &str,
        remind_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO reminders (entry, reminder_time, time) VALUES (?1, ?2, ?3)")
            .bind(entry)
            .bind(remind_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_reminders(&self, limit: i64) -> Result<Vec<Reminder>, sqlx::Error> {
        sqlx::query_as::<_, Reminder>(
            "SELECT id, entry, reminder_time, time FROM reminders ORDER BY reminder_time DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Reminders whose due time falls inside the current local day, in
    /// due order.
    pub async fn todays_reminders(&self) -> Result<Vec<Reminder>, sqlx::Error> {
        let (start, end) = local_day_bounds();
        sqlx::query_as::<_, Reminder>(
            "SELECT id, entry, reminder_time, time FROM reminders \
             WHERE reminder_time >= ?1 AND reminder_time < ?2 ORDER BY reminder_time ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn set_daily_focus(
        &self,
        entry: &str,
        remind_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO daily_focus (entry, reminder_time, time) VALUES (?1, ?2, ?3)")
            .bind(entry)
            .bind(remind_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Latest focus set for the current local day, if any.
    pub async fn todays_focus(&self) -> Result<Option<DailyFocus>, sqlx::Error> {
        let (start, end) = local_day_bounds();
        sqlx::query_as::<_, DailyFocus>(
            "SELECT id, entry, reminder_time, time FROM daily_focus \
             WHERE reminder_time >= ?1 AND reminder_time < ?2 ORDER BY time DESC, id DESC LIMIT 1",
        )
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await
    }
}

/// UTC instants bounding the current local calendar day.
fn local_day_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Local::now();
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let start = Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or(now);
    (
        start.with_timezone(&Utc),
        (start + Duration::days(1)).with_timezone(&Utc),
    )
}
