//! Note store operations.
//!
//! A note row owns the link to its article (`article_id`). Deleting a note
//! therefore also removes it from the article's derived notes list.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::Database;
use crate::error::{AppError, AppResult};
use crate::models::Note;

const NOTE_COLUMNS: &str = "id, body, article_id, created_at";

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        body: row.get(1)?,
        article: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(super) fn notes_for_article(conn: &Connection, article_id: &str) -> AppResult<Vec<Note>> {
    let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE article_id = ?1 ORDER BY rowid");
    let mut stmt = conn.prepare(&sql)?;
    let notes = stmt
        .query_map([article_id], note_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(notes)
}

pub(super) fn note_ids_for_article(conn: &Connection, article_id: &str) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM notes WHERE article_id = ?1 ORDER BY rowid")?;
    let ids = stmt
        .query_map([article_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

impl Database {
    /// Store a note bound to `article_id`.
    ///
    /// The article id is written as given; callers check that it exists.
    #[instrument(level = "info", skip(self, body), fields(body_len = body.len()))]
    pub fn create_note(&self, body: &str, article_id: &str) -> AppResult<Note> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO notes (id, body, article_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![&id, body, article_id, &created_at],
        )?;
        debug!(%id, "Stored note");

        Ok(Note {
            id,
            body: body.to_string(),
            article: Some(article_id.to_string()),
            created_at,
        })
    }

    pub fn get_note(&self, id: &str) -> AppResult<Note> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1");
        self.conn()
            .query_row(&sql, [id], note_from_row)
            .optional()?
            .ok_or_else(|| AppError::note_not_found(id))
    }

    /// Delete a note row. The owning article row is not touched.
    #[instrument(level = "info", skip(self))]
    pub fn delete_note(&self, id: &str) -> AppResult<()> {
        let changed = self.conn().execute("DELETE FROM notes WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::note_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleCandidate;

    fn seeded() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let article = db
            .create_article(&ArticleCandidate {
                title: "Headline".to_string(),
                summary: "Summary".to_string(),
                link: "https://www.nytimes.com/headline".to_string(),
            })
            .unwrap();
        (db, article.id)
    }

    #[test]
    fn test_create_note_attaches_to_article() {
        let (db, article_id) = seeded();
        let note = db.create_note("interesting", &article_id).unwrap();

        assert_eq!(note.article.as_deref(), Some(article_id.as_str()));
        let article = db.get_article(&article_id).unwrap();
        assert_eq!(article.notes.len(), 1);
        assert_eq!(article.notes[0].id, note.id);
        assert_eq!(article.notes[0].body, "interesting");
    }

    #[test]
    fn test_delete_note_removes_it_everywhere() {
        let (db, article_id) = seeded();
        let keep = db.create_note("keep", &article_id).unwrap();
        let gone = db.create_note("gone", &article_id).unwrap();

        db.delete_note(&gone.id).unwrap();

        assert!(matches!(
            db.get_note(&gone.id),
            Err(AppError::NotFound { entity: "note", .. })
        ));
        let article = db.get_article(&article_id).unwrap();
        let ids: Vec<&str> = article.notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![keep.id.as_str()]);
    }

    #[test]
    fn test_delete_missing_note_is_not_found() {
        let (db, _) = seeded();
        assert!(matches!(
            db.delete_note("missing"),
            Err(AppError::NotFound { entity: "note", .. })
        ));
    }

    #[test]
    fn test_empty_body_is_accepted() {
        let (db, article_id) = seeded();
        let note = db.create_note("", &article_id).unwrap();
        assert_eq!(db.get_note(&note.id).unwrap().body, "");
    }
}
