use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_projects_table(conn)?;
    create_tasks_table(conn)?;
    run_task_migrations(conn)?;
    create_events_table(conn)?;
    Ok(())
}

fn create_projects_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT
        )",
        [],
    )
    .context("Failed to create projects table")?;

    Ok(())
}

// No foreign key on project_id: tasks may reference deleted projects
fn create_tasks_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            project_id TEXT,
            status TEXT NOT NULL DEFAULT 'todo',
            scheduled_date TEXT,
            scheduled_start_time TEXT,
            scheduled_end_time TEXT,
            include_time INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create tasks table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_scheduled_date ON tasks(scheduled_date)",
        [],
    )
    .context("Failed to create tasks index")?;

    Ok(())
}

fn run_task_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "tasks",
        "scheduled_start_utc",
        "ALTER TABLE tasks ADD COLUMN scheduled_start_utc TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "tasks",
        "scheduled_end_utc",
        "ALTER TABLE tasks ADD COLUMN scheduled_end_utc TEXT",
    )?;

    Ok(())
}

fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            start_datetime TEXT NOT NULL,
            end_datetime TEXT NOT NULL,
            is_all_day INTEGER NOT NULL DEFAULT 0,
            color TEXT NOT NULL,
            is_draggable INTEGER NOT NULL DEFAULT 1,
            is_completed INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create events table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_datetime)",
        [],
    )
    .context("Failed to create events index")?;

    Ok(())
}
