//! # News Headlines
//!
//! A small server that scrapes a news site's front page into SQLite and lets
//! a user annotate ("notes") and archive ("save") the stories over a JSON API.
//!
//! ## Usage
//!
//! ```sh
//! news_headlines --port 3000 --database ./news_headlines.db
//! curl localhost:3000/scrape
//! curl localhost:3000/articles
//! ```
//!
//! ## Architecture
//!
//! 1. **Scraping** ([`scrapers`]): fetch the front page, extract one record
//!    per `<article>` block, insert each record
//! 2. **Storage** ([`db`]): articles and notes in SQLite; a note owns the link
//!    to its article
//! 3. **API** ([`api`]): actix-web routes composing store calls
//!
//! The database handle is opened before the server starts and closed after
//! it stops.

use actix_web::{web, App, HttpServer};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod scrapers;
mod utils;

use api::AppState;
use cli::Cli;
use config::Config;
use db::Database;
use scrapers::Scraper;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_headlines starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::resolve(&args)?;
    info!(
        database = %config.database_path,
        source = %config.source_url,
        origin = %config.link_origin,
        timeout_secs = ?config.fetch_timeout_secs,
        "Configuration resolved"
    );

    // ---- Storage ----
    let db = Arc::new(Database::open(&config.database_path)?);
    let scraper = Scraper::from_config(&config)?;

    let state = web::Data::new(AppState {
        db: Arc::clone(&db),
        scraper,
    });

    // ---- HTTP server ----
    let (host, port) = config.bind_addr();
    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(api::config))
        .bind((host.as_str(), port))?
        .run();
    info!(%host, port, "App running");

    server.await?;
    info!("HTTP server stopped");

    match Arc::try_unwrap(db) {
        Ok(db) => db.close()?,
        Err(_) => warn!("Database handle still shared at shutdown; dropping without explicit close"),
    }

    Ok(())
}
