//! Data models for scraped articles and the notes attached to them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ArticleCandidate`]: Raw record pulled out of the front page HTML
//! - [`Article`]: A stored article, generic over how its notes are represented
//! - [`Note`]: A free-text annotation bound to at most one article
//!
//! The note relationship is owned by [`Note::article`]. An article's `notes`
//! list is always derived from the notes table, never stored on the article.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news item as extracted from one `<article>` block, before persistence.
///
/// Missing elements in the block yield empty strings rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCandidate {
    /// Text of the first heading in the block.
    pub title: String,
    /// First list item when the block has a list, otherwise the first paragraph.
    pub summary: String,
    /// Absolute link to the story.
    pub link: String,
}

/// A stored article.
///
/// The type parameter selects how `notes` is rendered:
/// - `Article` (the default, `N = String`) carries note ids, used by raw listings
/// - [`PopulatedArticle`] carries full [`Note`] values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article<N = String> {
    /// System-generated UUID.
    pub id: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    /// `true` once the user archived the article for review.
    pub saved: bool,
    pub created_at: DateTime<Utc>,
    /// Notes currently attached, in the order they were attached.
    pub notes: Vec<N>,
}

/// An article with its notes resolved.
pub type PopulatedArticle = Article<Note>;

/// A user annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// System-generated UUID.
    pub id: String,
    pub body: String,
    /// Owning article, or `None` once the note has been detached.
    pub article: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one scrape run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// Number of `<article>` blocks found on the page.
    pub found: usize,
    /// Number of candidates persisted.
    pub stored: usize,
    /// Number of candidates whose insert failed.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_article_serializes_note_ids() {
        let article = Article {
            id: "a1".to_string(),
            title: "T".to_string(),
            summary: String::new(),
            link: "https://example.com".to_string(),
            saved: false,
            created_at: Utc::now(),
            notes: vec!["n1".to_string()],
        };

        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["notes"], serde_json::json!(["n1"]));
        assert_eq!(value["saved"], serde_json::json!(false));
    }
}
