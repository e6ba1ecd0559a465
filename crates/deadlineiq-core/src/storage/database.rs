//! SQLite-backed persistence.
//!
//! Provides storage for:
//! - The assignment collection (bulk-written after every mutation)
//! - Dashboard settings and the reminder rate-limit anchor (kv store)
//! - Daily completion counts for the productivity history

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, types::Type, Connection};

use crate::assignment::{Assignment, AssignmentStatus};
use crate::error::{CoreError, StorageError};
use crate::focus::FocusStats;
use crate::priority::PriorityLevel;
use crate::views::ViewMode;

use super::{data_dir, AssignmentStore};

/// SQLite database for the dashboard.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/deadlineiq/deadlineiq.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("deadlineiq.db");
        Self::open_at(&path)
    }

    /// Open at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database, used by tests.
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS assignments (
                    id              INTEGER PRIMARY KEY,
                    name            TEXT NOT NULL,
                    class_name      TEXT NOT NULL,
                    due_date        TEXT NOT NULL,
                    grade_weight    REAL NOT NULL,
                    estimated_hours REAL NOT NULL,
                    current_grade   REAL NOT NULL,
                    status          TEXT NOT NULL DEFAULT 'not_started',
                    progress        REAL NOT NULL DEFAULT 0,
                    completed_at    TEXT,
                    notes           TEXT,
                    priority_score  INTEGER NOT NULL DEFAULT 0,
                    priority_level  TEXT NOT NULL DEFAULT 'low'
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS completions (
                    day   TEXT PRIMARY KEY,
                    count INTEGER NOT NULL DEFAULT 0
                );

                CREATE INDEX IF NOT EXISTS idx_assignments_due_date ON assignments(due_date);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    fn load_assignments(&self) -> Result<Vec<Assignment>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, class_name, due_date, grade_weight, estimated_hours,
                    current_grade, status, progress, completed_at, notes,
                    priority_score, priority_level
             FROM assignments ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let due_date: String = row.get(3)?;
            let status: String = row.get(7)?;
            let completed_at: Option<String> = row.get(9)?;
            let level: String = row.get(12)?;
            Ok(Assignment {
                id: row.get(0)?,
                name: row.get(1)?,
                class_name: row.get(2)?,
                due_date: parse_datetime(3, &due_date)?,
                grade_weight: row.get(4)?,
                estimated_hours: row.get(5)?,
                current_grade: row.get(6)?,
                status: AssignmentStatus::parse(&status).ok_or_else(|| {
                    rusqlite::Error::InvalidColumnType(7, status.clone(), Type::Text)
                })?,
                progress: row.get(8)?,
                completed_at: completed_at
                    .as_deref()
                    .map(|s| parse_datetime(9, s))
                    .transpose()?,
                notes: row.get(10)?,
                priority_score: row.get(11)?,
                priority_level: PriorityLevel::parse(&level).unwrap_or_default(),
                hours_until_due: 0.0,
                days_until_due: 0.0,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Rewrite the whole collection in one transaction.
    fn save_assignments(&mut self, records: &[Assignment]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM assignments", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO assignments (id, name, class_name, due_date, grade_weight,
                    estimated_hours, current_grade, status, progress, completed_at,
                    notes, priority_score, priority_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for a in records {
                stmt.execute(params![
                    a.id,
                    a.name,
                    a.class_name,
                    a.due_date.to_rfc3339(),
                    a.grade_weight,
                    a.estimated_hours,
                    a.current_grade,
                    a.status.as_str(),
                    a.progress,
                    a.completed_at.map(|t| t.to_rfc3339()),
                    a.notes,
                    a.priority_score,
                    a.priority_level.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn current_view(&self) -> Result<ViewMode, StorageError> {
        Ok(self
            .kv_get("current_view")?
            .and_then(|v| ViewMode::from_str(&v))
            .unwrap_or_default())
    }

    pub fn set_current_view(&self, view: ViewMode) -> Result<(), StorageError> {
        self.kv_set("current_view", view.as_str())
    }

    pub fn show_completed(&self) -> Result<bool, StorageError> {
        Ok(self.kv_get("show_completed")?.as_deref() != Some("false"))
    }

    pub fn set_show_completed(&self, show: bool) -> Result<(), StorageError> {
        self.kv_set("show_completed", if show { "true" } else { "false" })
    }

    pub fn notifications_enabled(&self) -> Result<bool, StorageError> {
        Ok(self.kv_get("notifications_enabled")?.as_deref() != Some("false"))
    }

    pub fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.kv_set("notifications_enabled", if enabled { "true" } else { "false" })
    }

    /// Rate-limit anchor of the reminder engine, persisted across runs.
    pub fn last_reminder_check(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self
            .kv_get("last_reminder_check")?
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|t| t.with_timezone(&Utc)))
    }

    pub fn set_last_reminder_check(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.kv_set("last_reminder_check", &at.to_rfc3339())
    }

    pub fn focus_stats(&self) -> Result<FocusStats, CoreError> {
        match self.kv_get("focus_stats")? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(FocusStats::default()),
        }
    }

    pub fn set_focus_stats(&self, stats: &FocusStats) -> Result<(), CoreError> {
        self.kv_set("focus_stats", &serde_json::to_string(stats)?)?;
        Ok(())
    }

    // ── Completion history ───────────────────────────────────────────

    /// Bump the completion counter for the given local day.
    pub fn record_completion(&self, day: NaiveDate) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO completions (day, count) VALUES (?1, 1)
             ON CONFLICT(day) DO UPDATE SET count = count + 1",
            params![day.to_string()],
        )?;
        Ok(())
    }

    /// Completion counts for the last 7 days ending at `today`, oldest
    /// first. Days with no completions report zero.
    pub fn completion_history(&self, today: NaiveDate) -> Result<Vec<u32>, StorageError> {
        let mut history = Vec::with_capacity(7);
        let mut stmt = self
            .conn
            .prepare("SELECT count FROM completions WHERE day = ?1")?;
        for back in (0..7).rev() {
            let day = today - Duration::days(back);
            let count = match stmt.query_row(params![day.to_string()], |row| row.get::<_, u32>(0))
            {
                Ok(c) => c,
                Err(rusqlite::Error::QueryReturnedNoRows) => 0,
                Err(e) => return Err(e.into()),
            };
            history.push(count);
        }
        Ok(history)
    }
}

fn parse_datetime(idx: usize, s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl AssignmentStore for Database {
    fn load(&self) -> Result<Vec<Assignment>, StorageError> {
        self.load_assignments()
    }

    fn save(&mut self, records: &[Assignment]) -> Result<(), StorageError> {
        self.save_assignments(records)
    }
}
