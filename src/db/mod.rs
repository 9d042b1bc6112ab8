//! SQLite-backed persistence for articles and notes.
//!
//! A single [`Database`] handle is opened at startup, shared with the HTTP
//! workers and closed on shutdown. Table operations live in submodules as
//! `impl Database` blocks:
//!
//! - [`articles`]: the article store (create, list, save/unsave, note links)
//! - [`notes`]: the note store (create, get, delete)
//!
//! # Schema
//!
//! ```text
//! articles(id TEXT PK, title, summary, link, saved, created_at)
//! notes(id TEXT PK, body, article_id NULL, created_at)
//! ```
//!
//! `notes.article_id` is the only link between the two tables. It is left
//! unconstrained so detaching a note is a plain `UPDATE ... SET NULL`.

mod articles;
mod notes;

use crate::error::{AppError, AppResult};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;
use std::path::Path;
use tracing::{info, instrument};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS articles (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    summary     TEXT NOT NULL,
    link        TEXT NOT NULL,
    saved       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_articles_saved ON articles(saved);

CREATE TABLE IF NOT EXISTS notes (
    id          TEXT PRIMARY KEY,
    body        TEXT NOT NULL,
    article_id  TEXT,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_notes_article ON notes(article_id);
";

/// Handle to the article/note database.
pub struct Database {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database file at `path` and ensure the schema exists.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self::init(conn)?;
        info!("Database opened");
        Ok(db)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> AppResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Flush and close the underlying connection.
    #[instrument(level = "info", skip_all)]
    pub fn close(self) -> AppResult<()> {
        self.conn
            .into_inner()
            .close()
            .map_err(|(_, e)| AppError::Store(e))?;
        info!("Database closed");
        Ok(())
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleCandidate;

    #[test]
    fn test_open_file_and_reopen_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.db");

        let db = Database::open(&path).unwrap();
        db.create_article(&ArticleCandidate {
            title: "T".to_string(),
            summary: "S".to_string(),
            link: "https://example.com/t".to_string(),
        })
        .unwrap();
        db.close().unwrap();

        let db = Database::open(&path).unwrap();
        let all = db.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "T");
    }

    #[test]
    fn test_schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.conn().execute_batch(SCHEMA).unwrap();
    }
}
