//! Article store operations.
//!
//! Inserts are append-only: scraping the same front page twice stores every
//! story twice. Articles are never deleted; "unsaving" clears the flag and
//! detaches the notes instead.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::notes::{note_ids_for_article, notes_for_article};
use super::Database;
use crate::error::{AppError, AppResult};
use crate::models::{Article, ArticleCandidate, Note, PopulatedArticle};

const ARTICLE_COLUMNS: &str = "id, title, summary, link, saved, created_at";

fn article_from_row<N>(row: &Row<'_>) -> rusqlite::Result<Article<N>> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        link: row.get(3)?,
        saved: row.get(4)?,
        created_at: row.get(5)?,
        notes: Vec::new(),
    })
}

fn find_article(conn: &Connection, id: &str) -> AppResult<Option<Article<Note>>> {
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1");
    let article = conn
        .query_row(&sql, [id], article_from_row::<Note>)
        .optional()?;
    Ok(article)
}

fn populated_article(conn: &Connection, id: &str) -> AppResult<PopulatedArticle> {
    let mut article = find_article(conn, id)?.ok_or_else(|| AppError::article_not_found(id))?;
    article.notes = notes_for_article(conn, id)?;
    Ok(article)
}

fn ensure_article(conn: &Connection, id: &str) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM articles WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::article_not_found(id))
    }
}

fn query_articles(conn: &Connection, saved: Option<bool>) -> AppResult<Vec<Article>> {
    let mut articles: Vec<Article> = match saved {
        Some(flag) => {
            let sql =
                format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE saved = ?1 ORDER BY rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([flag], article_from_row::<String>)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], article_from_row::<String>)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    for article in &mut articles {
        article.notes = note_ids_for_article(conn, &article.id)?;
    }
    Ok(articles)
}

impl Database {
    /// Insert a freshly scraped article. Never deduplicates.
    #[instrument(level = "debug", skip_all, fields(link = %candidate.link))]
    pub fn create_article(&self, candidate: &ArticleCandidate) -> AppResult<Article> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO articles (id, title, summary, link, saved, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                &id,
                &candidate.title,
                &candidate.summary,
                &candidate.link,
                &created_at
            ],
        )?;
        debug!(%id, "Stored article");

        Ok(Article {
            id,
            title: candidate.title.clone(),
            summary: candidate.summary.clone(),
            link: candidate.link.clone(),
            saved: false,
            created_at,
            notes: Vec::new(),
        })
    }

    /// Every article, in insertion order, with note ids.
    pub fn list_all(&self) -> AppResult<Vec<Article>> {
        query_articles(&self.conn(), None)
    }

    /// Articles filtered on the `saved` flag, with note ids.
    pub fn list_by_saved(&self, saved: bool) -> AppResult<Vec<Article>> {
        query_articles(&self.conn(), Some(saved))
    }

    /// Freshly scraped articles that have not been archived.
    pub fn list_unsaved(&self) -> AppResult<Vec<Article>> {
        self.list_by_saved(false)
    }

    /// Archived articles with their notes resolved.
    pub fn list_saved(&self) -> AppResult<Vec<PopulatedArticle>> {
        let conn = self.conn();
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE saved = 1 ORDER BY rowid");
        let mut stmt = conn.prepare(&sql)?;
        let mut articles: Vec<PopulatedArticle> = stmt
            .query_map([], article_from_row::<Note>)?
            .collect::<Result<_, _>>()?;

        for article in &mut articles {
            article.notes = notes_for_article(&conn, &article.id)?;
        }
        Ok(articles)
    }

    /// One article with its notes resolved.
    pub fn get_article(&self, id: &str) -> AppResult<PopulatedArticle> {
        populated_article(&self.conn(), id)
    }

    /// Notes currently attached to `article_id`, oldest first.
    pub fn list_notes_for_article(&self, article_id: &str) -> AppResult<Vec<Note>> {
        let conn = self.conn();
        ensure_article(&conn, article_id)?;
        notes_for_article(&conn, article_id)
    }

    /// Set `saved`. Notes are left as they are.
    #[instrument(level = "info", skip(self))]
    pub fn mark_saved(&self, id: &str) -> AppResult<PopulatedArticle> {
        let conn = self.conn();
        let changed = conn.execute("UPDATE articles SET saved = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::article_not_found(id));
        }
        populated_article(&conn, id)
    }

    /// Clear `saved` and detach every note. Detached notes stay in the note store.
    #[instrument(level = "info", skip(self))]
    pub fn unsave(&self, id: &str) -> AppResult<PopulatedArticle> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        let changed = tx.execute("UPDATE articles SET saved = 0 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::article_not_found(id));
        }
        let detached = tx.execute(
            "UPDATE notes SET article_id = NULL WHERE article_id = ?1",
            [id],
        )?;
        tx.commit()?;
        debug!(detached, "Detached notes from unsaved article");

        populated_article(&conn, id)
    }

    /// Attach an existing note to an article, moving it if it belonged elsewhere.
    #[instrument(level = "info", skip(self))]
    pub fn append_note(&self, article_id: &str, note_id: &str) -> AppResult<PopulatedArticle> {
        let conn = self.conn();
        ensure_article(&conn, article_id)?;
        let changed = conn.execute(
            "UPDATE notes SET article_id = ?1 WHERE id = ?2",
            params![article_id, note_id],
        )?;
        if changed == 0 {
            return Err(AppError::note_not_found(note_id));
        }
        populated_article(&conn, article_id)
    }

    /// Remove a note from an article's list. A note that is not attached is ignored.
    #[instrument(level = "info", skip(self))]
    pub fn detach_note(&self, article_id: &str, note_id: &str) -> AppResult<PopulatedArticle> {
        let conn = self.conn();
        ensure_article(&conn, article_id)?;
        conn.execute(
            "UPDATE notes SET article_id = NULL WHERE id = ?1 AND article_id = ?2",
            params![note_id, article_id],
        )?;
        populated_article(&conn, article_id)
    }
}
