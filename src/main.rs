// Focus Calendar
// Prints the merged task/event agenda for a day or week

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use focus_calendar::models::event::CalendarEvent;
use focus_calendar::models::settings::Settings;
use focus_calendar::services::database::Database;
use focus_calendar::services::layout::{events_on_date, week_dates};
use focus_calendar::services::merge::{merge_events, MergeOptions};
use focus_calendar::services::store::{EventStore, SqliteEventStore, SqliteTaskStore, TaskStore};
use focus_calendar::utils::date::parse_date;

#[derive(Parser)]
#[command(name = "focus-calendar")]
#[command(about = "Show scheduled tasks and events from the Focus Calendar database")]
struct Cli {
    /// Day to show (YYYY-MM-DD), defaults to today
    date: Option<String>,

    /// Show the whole week containing the date
    #[arg(short, long)]
    week: bool,

    /// Print the agenda as JSON
    #[arg(long)]
    json: bool,

    /// Settings file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::load().context("Failed to load settings")?,
    };

    let date = match cli.date.as_deref() {
        Some(value) => parse_date(value)
            .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))?,
        None => Local::now().date_naive(),
    };

    let db_path = settings.resolve_database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    log::info!("Opening database at {}", db_path.display());

    let db = Database::new(&db_path.to_string_lossy())?;
    db.initialize_schema()?;

    let tasks = SqliteTaskStore::new(&db);
    let events = SqliteEventStore::new(&db);
    let merged = merge_events(
        &events.events()?,
        &tasks.tasks()?,
        &tasks.projects()?,
        &MergeOptions::from_settings(&settings),
    );

    let days = if cli.week {
        week_dates(date, settings.first_day_of_week)
    } else {
        vec![date]
    };

    let agenda: Vec<(NaiveDate, Vec<CalendarEvent>)> = days
        .into_iter()
        .map(|day| {
            let entries = events_on_date(&merged, day, settings.min_visual_duration());
            (day, entries)
        })
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
    } else {
        print_agenda(&agenda);
    }

    Ok(())
}

fn print_agenda(agenda: &[(NaiveDate, Vec<CalendarEvent>)]) {
    for (day, entries) in agenda {
        println!("{}", day.format("%A %Y-%m-%d"));
        if entries.is_empty() {
            println!("  (nothing scheduled)");
        }
        for event in entries {
            let when = if event.all_day {
                "all day".to_string()
            } else {
                format!(
                    "{} - {}",
                    event.start.format("%H:%M"),
                    event.end.format("%H:%M")
                )
            };
            let mark = if event.is_completed { "x" } else { " " };
            let kind = if event.is_task { "task" } else { "event" };
            println!("  [{}] {:<13} {} ({})", mark, when, event.title, kind);
        }
        println!();
    }
}
