//! Listing of the sessions that hold stored progress.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::sync::MutexGuard;

use sweetrivia_core::{DraftError, COUNT_KEY};

use crate::unavailable;

/// One session with stored data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSummary {
    pub scope: String,
    /// Raw stored count, if one was chosen
    pub question_count: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Scopes store with a borrowed connection.
pub struct Scopes<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Scopes<'db> {
    /// Create a new Scopes store with a borrowed connection.
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// List sessions, most recently touched first.
    pub fn list(&self) -> Result<Vec<ScopeSummary>, DraftError> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT scope,
                       MAX(CASE WHEN key = ?1 THEN value END),
                       MAX(updated_at) AS last_update
                FROM kv
                GROUP BY scope
                ORDER BY last_update DESC
                "#,
            )
            .map_err(unavailable)?;

        let rows = stmt
            .query_map(params![COUNT_KEY], |row| {
                let updated_at: String = row.get(2)?;
                Ok(ScopeSummary {
                    scope: row.get(0)?,
                    question_count: row.get(1)?,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })
            .map_err(unavailable)?;

        let mut scopes = Vec::new();
        for row in rows {
            scopes.push(row.map_err(unavailable)?);
        }

        Ok(scopes)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use sweetrivia_core::{DraftStore, QuestionCount};

    #[test]
    fn test_list_scopes() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.scopes().unwrap().list().unwrap().is_empty());

        db.area("a")
            .save_count(QuestionCount::new(4).unwrap())
            .unwrap();
        db.area("b").save_questions(&[]).unwrap();

        let scopes = db.scopes().unwrap().list().unwrap();
        assert_eq!(scopes.len(), 2);

        let a = scopes.iter().find(|s| s.scope == "a").unwrap();
        assert_eq!(a.question_count.as_deref(), Some("4"));
        let b = scopes.iter().find(|s| s.scope == "b").unwrap();
        assert_eq!(b.question_count, None);
    }
}
