//! Terminal flows: the daily check-in questions, the morning focus prompt,
//! entry listings, and the layout of the `github` report.
//!
//! The interactive functions are generic over their reader and writer so
//! tests can drive them with in-memory buffers.

use std::io::{self, BufRead, Write};

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::database::models::EntryCategory;
use crate::database::Database;
use crate::error::StandupError;
use crate::github::aggregate::WorkSummary;
use crate::github::format::{format_issues, format_prs};

const LIST_LIMIT: i64 = 500;
const REMINDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub struct Cli<'a> {
    db: &'a Database,
}

impl<'a> Cli<'a> {
    pub fn new(db: &'a Database) -> Self {
        Cli { db }
    }

    /// Walk through the daily check-in questions on stdin/stdout.
    pub async fn run_questions(&self) -> Result<(), StandupError> {
        let stdin = io::stdin();
        self.run_questions_io(&mut stdin.lock(), &mut io::stdout())
            .await
    }

    pub async fn run_questions_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), StandupError> {
        self.ask_entry(
            input,
            output,
            EntryCategory::Journal,
            "\n📝 Do you have anything to add to your journal? (yes/no)",
            "Enter your journal entry:",
            "✓ Journal entry saved",
        )
        .await?;
        self.ask_entry(
            input,
            output,
            EntryCategory::Exercise,
            "\n💪 Do you have anything to add to your exercise log? (yes/no)",
            "Enter your exercise details:",
            "✓ Exercise entry saved",
        )
        .await?;
        self.ask_entry(
            input,
            output,
            EntryCategory::Symptoms,
            "\n🩺 Do you have any symptoms to track? (yes/no)",
            "Enter your symptoms:",
            "✓ Symptom entry saved",
        )
        .await?;
        self.ask_reminders(input, output).await
    }

    async fn ask_entry<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        category: EntryCategory,
        question: &str,
        prompt: &str,
        saved: &str,
    ) -> Result<(), StandupError> {
        writeln!(output, "{}", question)?;
        if !is_yes(&read_line(input)?) {
            return Ok(());
        }
        writeln!(output, "{}", prompt)?;
        let entry = read_line(input)?;
        if !entry.is_empty() {
            self.db.add_entry(category, &entry).await?;
            writeln!(output, "{}", saved)?;
        }
        Ok(())
    }

    async fn ask_reminders<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), StandupError> {
        writeln!(output, "\n⏰ Do you have any reminders to add? (yes/no)")?;
        if !is_yes(&read_line(input)?) {
            return Ok(());
        }
        loop {
            writeln!(output, "Enter reminder item:")?;
            let item = read_line(input)?;
            if item.is_empty() {
                break;
            }
            writeln!(
                output,
                "Enter reminder time (format: YYYY-MM-DD HH:MM, e.g., 2025-12-25 14:30):"
            )?;
            let time_str = read_line(input)?;
            let remind_at = match parse_local(&time_str) {
                Some(t) => t,
                None => {
                    writeln!(output, "Invalid time format. Please use YYYY-MM-DD HH:MM")?;
                    continue;
                }
            };
            self.db.add_reminder(&item, remind_at).await?;
            writeln!(output, "✓ Reminder saved")?;
            writeln!(output, "\nAdd another reminder? (yes/no)")?;
            if !is_yes(&read_line(input)?) {
                break;
            }
        }
        Ok(())
    }

    /// Ask for a special focus for today; stores it with a 1 PM reminder.
    pub async fn ask_morning_question(&self) -> Result<(), StandupError> {
        let stdin = io::stdin();
        self.ask_morning_question_io(&mut stdin.lock(), &mut io::stdout())
            .await
    }

    pub async fn ask_morning_question_io<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<(), StandupError> {
        writeln!(
            output,
            "\n🌅 Good morning! Is there anything special you want to work on today? (or type 'no')"
        )?;
        let answer = read_line(input)?;
        if answer.is_empty() || matches!(answer.to_lowercase().as_str(), "no" | "n") {
            return Ok(());
        }
        self.db.set_daily_focus(&answer, todays_one_pm()).await?;
        writeln!(output, "✓ I'll remind you about this at 1 PM today")?;
        Ok(())
    }

    pub async fn list_entries<W: Write>(
        &self,
        output: &mut W,
        category: &str,
    ) -> Result<(), StandupError> {
        if category == "reminders" {
            return self.list_reminders(output).await;
        }
        let cat = match EntryCategory::from_name(category) {
            Some(cat) => cat,
            None => {
                return Err(StandupError::ConfigError(format!(
                    "unknown category: {}. Use: journal, exercise, symptoms, or reminders",
                    category
                )))
            }
        };
        let entries = self.db.list_entries(cat, LIST_LIMIT).await?;
        let (heading, empty) = match cat {
            EntryCategory::Journal => ("📝 Journal Entries:", "No journal entries found."),
            EntryCategory::Exercise => ("💪 Exercise Entries:", "No exercise entries found."),
            EntryCategory::Symptoms => ("🩺 Symptom Entries:", "No symptom entries found."),
        };
        if entries.is_empty() {
            writeln!(output, "{}", empty)?;
            return Ok(());
        }
        writeln!(output, "\n{}", heading)?;
        writeln!(output, "{}", "-".repeat(60))?;
        for entry in &entries {
            writeln!(output, "[{}]\n{}\n", format_local(entry.time), entry.entry)?;
        }
        Ok(())
    }

    async fn list_reminders<W: Write>(&self, output: &mut W) -> Result<(), StandupError> {
        let reminders = self.db.list_reminders(LIST_LIMIT).await?;
        if reminders.is_empty() {
            writeln!(output, "No reminders found.")?;
            return Ok(());
        }
        writeln!(output, "\n⏰ Reminders:")?;
        writeln!(output, "{}", "-".repeat(60))?;
        for reminder in &reminders {
            writeln!(
                output,
                "[Created: {}] [Remind at: {}]\n{}\n",
                format_local(reminder.time),
                format_local(reminder.reminder_time),
                reminder.entry
            )?;
        }
        Ok(())
    }
}

/// Which sections the `github` report shows and the settings it ran under.
#[derive(Debug, Clone)]
pub struct ReportView {
    pub username: String,
    pub board_configured: bool,
    pub stale_weeks: i64,
    pub merge_window_hours: i64,
    pub merged_only: bool,
    pub now: DateTime<Utc>,
}

pub fn render_github_report(summary: &WorkSummary, view: &ReportView) -> String {
    let mut out = String::new();
    if !summary.warnings.is_empty() {
        out.push_str("\n⚠ Some sources could not be fetched:\n");
        for warning in &summary.warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
    }
    if view.merged_only {
        out.push_str(&format!(
            "\n🔀 Recently merged PRs (last {}h):\n",
            view.merge_window_hours
        ));
        out.push_str(&format_prs(&summary.recent_merged_prs));
        out.push('\n');
        return out;
    }
    out.push_str(&format!("\n🔧 GitHub standup for {}\n", view.username));
    if view.board_configured {
        out.push_str("\n📌 Project board issues:\n");
        out.push_str(&format_issues(&summary.project_issues, view.now));
        out.push('\n');
        out.push_str(&format!(
            "\n⏳ On the board for more than {} weeks:\n",
            view.stale_weeks
        ));
        out.push_str(&format_issues(&summary.stale_issues, view.now));
        out.push('\n');
    }
    out.push_str("\n📋 Issues assigned to you:\n");
    out.push_str(&format_issues(&summary.assigned_issues, view.now));
    out.push('\n');
    out.push_str("\n💬 Issues mentioning you:\n");
    out.push_str(&format_issues(&summary.mentioned_issues, view.now));
    out.push('\n');
    out.push_str("\n💬 Pull requests mentioning you:\n");
    out.push_str(&format_prs(&summary.mentioned_prs));
    out.push('\n');
    out.push_str(&format!(
        "\n🔀 Recently merged PRs (last {}h):\n",
        view.merge_window_hours
    ));
    out.push_str(&format_prs(&summary.recent_merged_prs));
    out.push('\n');
    out
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String, StandupError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "yes" | "y")
}

/// Parse `YYYY-MM-DD HH:MM` as local wall-clock time.
fn parse_local(s: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(s, REMINDER_TIME_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

fn format_local(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn todays_one_pm() -> DateTime<Utc> {
    let now = Local::now();
    let one_pm = NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN);
    Local
        .from_local_datetime(&now.date_naive().and_time(one_pm))
        .earliest()
        .unwrap_or(now)
        .with_timezone(&Utc)
}
