//! Database layer for sweetrivia.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and hands out per-session key-value areas.

mod area;
mod scopes;

pub use area::ScopedArea;
pub use scopes::{ScopeSummary, Scopes};

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use sweetrivia_core::DraftError;

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/sweetrivia/sweetrivia.db`.
    pub fn open() -> Result<Self, rusqlite::Error> {
        let db_path = Self::default_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %path.display(), "Opened draft database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sweetrivia")
            .join("sweetrivia.db")
    }

    /// Key-value area for one session.
    pub fn area(&self, scope: &str) -> ScopedArea<'_> {
        ScopedArea::new(self, scope)
    }

    /// Access the session listing.
    pub fn scopes(&self) -> Result<Scopes<'_>, DraftError> {
        Ok(Scopes::new(self.lock()?))
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, DraftError> {
        self.conn
            .lock()
            .map_err(|_| DraftError::Unavailable("Database lock poisoned".to_string()))
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                scope TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (scope, key)
            );

            CREATE INDEX IF NOT EXISTS idx_kv_updated_at ON kv(updated_at DESC);
            "#,
        )
    }
}

pub(crate) fn unavailable(err: rusqlite::Error) -> DraftError {
    DraftError::Unavailable(err.to_string())
}
