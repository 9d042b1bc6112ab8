//! Front page scraping pipeline.
//!
//! A scrape runs in three steps:
//!
//! 1. **Fetching** ([`fetch`]): download the configured front page
//! 2. **Extracting** ([`front_page`]): turn each `<article>` block into an
//!    [`ArticleCandidate`]
//! 3. **Persisting**: insert the candidates one by one
//!
//! A fetch failure aborts the run. A failed insert is logged and skipped so
//! the remaining candidates are still stored.

pub mod fetch;
pub mod front_page;

use crate::config::Config;
use crate::db::Database;
use crate::error::AppResult;
use crate::models::{ArticleCandidate, ScrapeReport};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Runs scrapes against one configured source.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
    source_url: String,
    link_origin: String,
}

impl Scraper {
    pub fn new(client: Client, source_url: String, link_origin: String) -> Self {
        Self {
            client,
            source_url,
            link_origin,
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = fetch::build_client(&config.user_agent, config.fetch_timeout())?;
        Ok(Self::new(
            client,
            config.source_url.clone(),
            config.link_origin.clone(),
        ))
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Fetch, extract and store the current front page.
    #[instrument(level = "info", skip_all, fields(source = %self.source_url))]
    pub async fn run(&self, db: Arc<Database>) -> AppResult<ScrapeReport> {
        let html = fetch::fetch_html(&self.client, &self.source_url).await?;
        let candidates = front_page::extract_articles(&html, &self.link_origin);

        let report = tokio::task::spawn_blocking(move || persist_all(&db, candidates)).await?;
        info!(
            found = report.found,
            stored = report.stored,
            failed = report.failed,
            "Scrape complete"
        );
        Ok(report)
    }
}

/// Insert every candidate, continuing past individual failures.
pub fn persist_all(db: &Database, candidates: Vec<ArticleCandidate>) -> ScrapeReport {
    let mut report = ScrapeReport {
        found: candidates.len(),
        ..ScrapeReport::default()
    };

    for candidate in &candidates {
        match db.create_article(candidate) {
            Ok(article) => {
                debug!(id = %article.id, title = %article.title, "Persisted article");
                report.stored += 1;
            }
            Err(e) => {
                error!(error = %e, link = %candidate.link, "Failed to persist article; skipping");
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use httpmock::prelude::*;

    const FIXTURE: &str = r#"
        <html><body>
          <article><h2>First</h2><p>Lead one</p><a href="/2024/first.html">read</a></article>
          <article><h2>Second</h2><ul><li>Bullet</li></ul><a href="/2024/second.html">read</a></article>
          <article><h2>Third</h2></article>
        </body></html>"#;

    fn scraper_for(server: &MockServer) -> Scraper {
        let client = fetch::build_client("news_headlines-test", None).unwrap();
        Scraper::new(client, server.url("/"), "https://www.nytimes.com".to_string())
    }

    #[tokio::test]
    async fn test_run_persists_every_block() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body(FIXTURE);
            })
            .await;
        let db = Arc::new(Database::open_in_memory().unwrap());

        let report = scraper_for(&server).run(Arc::clone(&db)).await.unwrap();

        assert_eq!(
            report,
            ScrapeReport {
                found: 3,
                stored: 3,
                failed: 0
            }
        );
        let stored = db.list_all().unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].title, "First");
        assert_eq!(stored[0].summary, "Lead one");
        assert_eq!(stored[0].link, "https://www.nytimes.com/2024/first.html");
        assert_eq!(stored[1].summary, "Bullet");
        assert_eq!(stored[2].summary, "");
        assert_eq!(stored[2].link, "https://www.nytimes.com");
        assert!(stored.iter().all(|a| !a.saved && a.notes.is_empty()));
    }

    #[tokio::test]
    async fn test_rescrape_appends_duplicates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body(FIXTURE);
            })
            .await;
        let db = Arc::new(Database::open_in_memory().unwrap());
        let scraper = scraper_for(&server);

        scraper.run(Arc::clone(&db)).await.unwrap();
        scraper.run(Arc::clone(&db)).await.unwrap();

        assert_eq!(db.list_all().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_run_fails_on_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(500);
            })
            .await;
        let db = Arc::new(Database::open_in_memory().unwrap());

        let err = scraper_for(&server).run(Arc::clone(&db)).await.unwrap_err();

        assert!(matches!(err, AppError::Network { .. }));
        assert!(db.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_persist_all_empty() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(persist_all(&db, Vec::new()), ScrapeReport::default());
    }

    #[test]
    fn test_persist_all_skips_failed_insert() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute_batch(
                "CREATE TRIGGER reject_bad BEFORE INSERT ON articles WHEN NEW.title = 'bad'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let candidates = ["a", "bad", "b"]
            .into_iter()
            .map(|title| ArticleCandidate {
                title: title.to_string(),
                summary: String::new(),
                link: format!("https://www.nytimes.com/{title}"),
            })
            .collect();

        let report = persist_all(&db, candidates);

        assert_eq!(
            report,
            ScrapeReport {
                found: 3,
                stored: 2,
                failed: 1
            }
        );
        let titles: Vec<String> = db.list_all().unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }
}
