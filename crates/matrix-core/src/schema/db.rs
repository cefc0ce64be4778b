use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::command::Category;
use crate::error::Result;
use crate::ids::{EntryId, SessionId};

use super::migrations::MIGRATIONS;

/// A processed command as stored in the history database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub session_id: SessionId,
    pub command: String,
    pub response: Option<String>,
    pub category: Option<Category>,
    pub success: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-category totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// `None` collects unrecognized commands.
    pub category: Option<Category>,
    pub total: u64,
    pub successful: u64,
}

/// The command history database.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                tracing::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

// Sessions
impl Database {
    /// Record the start of a session.
    pub fn start_session(&self, wake_word: &str) -> Result<SessionId> {
        let id = SessionId::new();
        self.conn.execute(
            "INSERT INTO sessions (id, wake_word, started_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id.to_string(), wake_word, timestamp(Utc::now())],
        )?;
        Ok(id)
    }

    pub fn count_sessions(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

// Command history
impl Database {
    /// Store one processed command.
    pub fn record_command(
        &self,
        session_id: SessionId,
        command: &str,
        response: Option<&str>,
        category: Option<Category>,
        success: bool,
    ) -> Result<EntryId> {
        let id = EntryId::new();
        self.conn.execute(
            "INSERT INTO commands (id, session_id, command, response, category, success, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                id.to_string(),
                session_id.to_string(),
                command,
                response,
                category.map(|c| c.as_str()),
                success,
                timestamp(Utc::now()),
            ],
        )?;
        Ok(id)
    }

    /// The most recent `limit` commands, oldest first.
    pub fn recent_commands(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, command, response, category, success, created_at
             FROM commands
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?1",
        )?;

        let mut entries = stmt
            .query_map([i64::try_from(limit).unwrap_or(i64::MAX)], |row| {
                Self::row_to_entry(row)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        entries.reverse();

        Ok(entries)
    }

    /// Totals per category, most used first.
    pub fn command_counts_by_category(&self) -> Result<Vec<CategoryCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT category, COUNT(*), SUM(success)
             FROM commands
             GROUP BY category
             ORDER BY COUNT(*) DESC, category",
        )?;

        let counts = stmt
            .query_map([], |row| {
                let category: Option<String> = row.get(0)?;
                let total: i64 = row.get(1)?;
                let successful: i64 = row.get(2)?;
                let category = category
                    .map(|c| c.parse::<Category>())
                    .transpose()
                    .map_err(|e| conversion_error(0, e))?;
                Ok(CategoryCount {
                    category,
                    total: u64::try_from(total).unwrap_or(0),
                    successful: u64::try_from(successful).unwrap_or(0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(counts)
    }

    pub fn count_commands(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commands", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Delete all stored commands. Returns how many were removed.
    pub fn clear_commands(&self) -> Result<usize> {
        let removed = self.conn.execute("DELETE FROM commands", [])?;
        tracing::info!("Cleared {} commands from history", removed);
        Ok(removed)
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        let id: String = row.get(0)?;
        let session_id: String = row.get(1)?;
        let category: Option<String> = row.get(4)?;
        let created_at: String = row.get(6)?;

        Ok(HistoryEntry {
            id: id.parse().map_err(|e| conversion_error(0, e))?,
            session_id: session_id.parse().map_err(|e| conversion_error(1, e))?,
            command: row.get(2)?,
            response: row.get(3)?,
            category: category
                .map(|c| c.parse::<Category>())
                .transpose()
                .map_err(|e| conversion_error(4, e))?,
            success: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| conversion_error(6, e))?
                .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.db");
        drop(Database::open(&path).unwrap());
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_record_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let session = db.start_session("matrix").unwrap();

        db.record_command(session, "open chrome", Some("Opening Chrome"), Some(Category::Apps), true)
            .unwrap();
        db.record_command(session, "zzzz", None, None, false).unwrap();

        let entries = db.recent_commands(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].command, "open chrome");
        assert_eq!(entries[0].category, Some(Category::Apps));
        assert_eq!(entries[0].response.as_deref(), Some("Opening Chrome"));
        assert!(entries[0].success);
        assert_eq!(entries[1].session_id, session);
        assert!(!entries[1].success);
        assert_eq!(db.count_sessions().unwrap(), 1);
    }

    #[test]
    fn test_recent_commands_limit_keeps_newest() {
        let db = Database::open_in_memory().unwrap();
        let session = db.start_session("matrix").unwrap();
        for i in 0..5 {
            db.record_command(session, &format!("cmd {i}"), None, None, false)
                .unwrap();
        }

        let entries = db.recent_commands(2).unwrap();
        let commands: Vec<_> = entries.iter().map(|e| e.command.as_str()).collect();
        assert_eq!(commands, ["cmd 3", "cmd 4"]);
    }

    #[test]
    fn test_counts_by_category() {
        let db = Database::open_in_memory().unwrap();
        let session = db.start_session("matrix").unwrap();
        db.record_command(session, "mute", None, Some(Category::Media), true).unwrap();
        db.record_command(session, "skip", None, Some(Category::Media), false).unwrap();
        db.record_command(session, "lock", None, Some(Category::Power), true).unwrap();

        let counts = db.command_counts_by_category().unwrap();
        assert_eq!(
            counts[0],
            CategoryCount {
                category: Some(Category::Media),
                total: 2,
                successful: 1,
            }
        );
        assert_eq!(counts[1].category, Some(Category::Power));
    }

    #[test]
    fn test_clear_commands() {
        let db = Database::open_in_memory().unwrap();
        let session = db.start_session("matrix").unwrap();
        db.record_command(session, "mute", None, Some(Category::Media), true).unwrap();

        assert_eq!(db.clear_commands().unwrap(), 1);
        assert_eq!(db.count_commands().unwrap(), 0);
    }
}
