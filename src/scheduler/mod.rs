//! Daily routines: a morning summary at 07:45 and an afternoon check-in
//! at 13:00 local time, delivered as desktop notifications.

pub mod notifier;

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};
use tracing::{error, info, warn};

use crate::database::Database;
use notifier::Notifier;

const MORNING_HOUR: u32 = 7;
const MORNING_MINUTE: u32 = 45;
const AFTERNOON_HOUR: u32 = 13;
const AFTERNOON_MINUTE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routine {
    Morning,
    Afternoon,
}

impl Routine {
    fn name(&self) -> &'static str {
        match self {
            Routine::Morning => "morning",
            Routine::Afternoon => "afternoon",
        }
    }
}

pub struct Scheduler {
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
}

impl Scheduler {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Runs forever. Notification failures are logged, never fatal; the
    /// daemon must survive a missing notification tool.
    pub async fn run(&self) {
        info!("scheduler started; morning 07:45, afternoon 13:00");
        loop {
            let now = Local::now();
            let (at, routine) = next_run(now);
            let wait = (at - now).to_std().unwrap_or_default();
            info!(at = %at, routine = routine.name(), "next scheduled routine");
            tokio::time::sleep(wait).await;
            match routine {
                Routine::Morning => self.morning_routine().await,
                Routine::Afternoon => self.afternoon_routine().await,
            }
        }
    }

    pub async fn morning_routine(&self) {
        info!("running morning routine");
        let message = self.morning_summary().await;
        if let Err(err) = self.notifier.notify("Standup - Morning Summary", &message) {
            error!(error = %err, "failed to send morning notification");
        }
    }

    pub async fn afternoon_routine(&self) {
        info!("running afternoon routine");
        let message = self.afternoon_summary().await;
        if let Err(err) = self.notifier.notify("Standup - 1 PM Check-in", &message) {
            error!(error = %err, "failed to send afternoon notification");
        }
    }

    /// Builds the morning notification text. Store errors degrade to a
    /// shorter message rather than cancelling the notification.
    async fn morning_summary(&self) -> String {
        let mut message = String::from("Good morning! Here's your daily summary:\n\n");

        match self.db.last_exercise_time().await {
            Ok(Some(at)) => {
                let hours = (Utc::now() - at).num_minutes() as f64 / 60.0;
                message.push_str(&format!("⏱ Last exercise: {:.1} hours ago\n\n", hours));
            }
            Ok(None) => message.push_str("⏱ No exercise logged yet\n\n"),
            Err(err) => warn!(error = %err, "failed to read exercise log"),
        }

        match self.db.todays_reminders().await {
            Ok(reminders) if !reminders.is_empty() => {
                message.push_str("📋 Today's reminders:\n");
                for reminder in &reminders {
                    message.push_str(&format!(
                        "  - {} (at {})\n",
                        reminder.entry,
                        reminder
                            .reminder_time
                            .with_timezone(&Local)
                            .format("%-I:%M %p")
                    ));
                }
                message.push('\n');
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "failed to read reminders"),
        }

        match self.db.todays_focus().await {
            Ok(Some(focus)) => {
                message.push_str(&format!("🎯 Today's focus: {}\n\n", focus.entry));
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to read daily focus"),
        }

        message.push_str("Run `standup morning` to set a focus for today.");
        message
    }

    async fn afternoon_summary(&self) -> String {
        let mut message = String::from("Time for your daily check-in!\n\n");
        message.push_str("Run `standup questions` to answer:\n");
        message.push_str("• Journal entry\n");
        message.push_str("• Exercise update\n");
        message.push_str("• Symptoms\n");
        message.push_str("• Reminders\n\n");

        match self.db.todays_focus().await {
            Ok(Some(focus)) => message.push_str(&format!("🎯 Remember: {}", focus.entry)),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "failed to read daily focus"),
        }

        message
    }
}

fn next_run(now: DateTime<Local>) -> (DateTime<Local>, Routine) {
    let morning = next_occurrence(now, MORNING_HOUR, MORNING_MINUTE);
    let afternoon = next_occurrence(now, AFTERNOON_HOUR, AFTERNOON_MINUTE);
    if morning <= afternoon {
        (morning, Routine::Morning)
    } else {
        (afternoon, Routine::Afternoon)
    }
}

/// Next strictly-future wall-clock occurrence of `hour:minute`, rolling
/// to tomorrow when today's slot has already passed.
fn next_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let slot = now.date_naive().and_time(NaiveTime::MIN)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute));
    let today = resolve_local(slot, now);
    if today > now {
        today
    } else {
        resolve_local(slot + Duration::days(1), now)
    }
}

fn resolve_local(naive: NaiveDateTime, fallback: DateTime<Local>) -> DateTime<Local> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or(fallback)
}
