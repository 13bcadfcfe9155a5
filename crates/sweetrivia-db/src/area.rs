//! SQLite-backed key-value area for one session.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use sweetrivia_core::{DraftError, KeyValueArea};

use crate::{unavailable, Database};

/// The `kv` rows belonging to one scope (session id).
///
/// Locks the connection per call, so it can be held across awaits.
pub struct ScopedArea<'db> {
    db: &'db Database,
    scope: String,
}

impl<'db> ScopedArea<'db> {
    pub(crate) fn new(db: &'db Database, scope: &str) -> Self {
        Self {
            db,
            scope: scope.to_string(),
        }
    }
}

impl KeyValueArea for ScopedArea<'_> {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        let conn = self.db.lock()?;
        conn.query_row(
            "SELECT value FROM kv WHERE scope = ?1 AND key = ?2",
            params![self.scope, key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(unavailable)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftError> {
        let conn = self.db.lock()?;
        conn.execute(
            r#"
            INSERT INTO kv (scope, key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![self.scope, key, value, Utc::now().to_rfc3339()],
        )
        .map_err(unavailable)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        let conn = self.db.lock()?;
        conn.execute(
            "DELETE FROM kv WHERE scope = ?1 AND key = ?2",
            params![self.scope, key],
        )
        .map_err(unavailable)?;
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), DraftError> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction().map_err(unavailable)?;
        for key in keys {
            tx.execute(
                "DELETE FROM kv WHERE scope = ?1 AND key = ?2",
                params![self.scope, key],
            )
            .map_err(unavailable)?;
        }
        tx.commit().map_err(unavailable)
    }
}
