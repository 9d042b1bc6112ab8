//! HTTP API over the article and note stores.
//!
//! Each endpoint is one request/response transaction composing store calls.
//! Store calls run on actix's blocking pool through [`with_db`]; errors are
//! rendered by [`AppError`]'s `ResponseError` impl (404 / 502 / 500 with a
//! `{"error": ...}` body).
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/` | unsaved articles |
//! | GET | `/saved` | saved articles, notes populated |
//! | GET | `/scrape` | `Scrape Complete` |
//! | GET | `/articles[?saved=bool]` | articles, note ids |
//! | GET | `/articles/{id}` | one article, notes populated |
//! | POST | `/articles/save/{id}` | updated article |
//! | POST | `/articles/delete/{id}` | updated article, notes detached |
//! | GET | `/articles/{id}/notes` | notes attached to one article |
//! | GET | `/notes/{id}` | one note |
//! | POST | `/notes/save/{id}` | updated article |
//! | DELETE | `/notes/delete/{note_id}/{article_id}` | `Note Deleted` |

use actix_web::{web, Either, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::scrapers::Scraper;

pub const SCRAPE_COMPLETE: &str = "Scrape Complete";
pub const NOTE_DELETED: &str = "Note Deleted";

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scraper: Scraper,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list_unsaved))
        .route("/saved", web::get().to(list_saved))
        .route("/scrape", web::get().to(scrape))
        .route("/articles", web::get().to(list_articles))
        .route("/articles/{id}", web::get().to(get_article))
        .route("/articles/{id}/notes", web::get().to(list_article_notes))
        .route("/notes/{id}", web::get().to(get_note))
        .route("/articles/save/{id}", web::post().to(save_article))
        .route("/articles/delete/{id}", web::post().to(unsave_article))
        .route("/notes/save/{id}", web::post().to(create_note))
        .route(
            "/notes/delete/{note_id}/{article_id}",
            web::delete().to(delete_note),
        );
}

/// Run a store operation on the blocking pool.
async fn with_db<T, F>(state: &web::Data<AppState>, op: F) -> AppResult<T>
where
    F: FnOnce(&Database) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(&state.db);
    web::block(move || op(&db)).await?
}

#[derive(Debug, Deserialize)]
struct ArticlesQuery {
    saved: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct NotePayload {
    text: String,
}

async fn list_unsaved(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let articles = with_db(&state, |db| db.list_unsaved()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn list_saved(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let articles = with_db(&state, |db| db.list_saved()).await?;
    Ok(HttpResponse::Ok().json(articles))
}

async fn list_articles(
    state: web::Data<AppState>,
    query: web::Query<ArticlesQuery>,
) -> AppResult<HttpResponse> {
    let saved = query.saved;
    let articles = with_db(&state, move |db| match saved {
        Some(flag) => db.list_by_saved(flag),
        None => db.list_all(),
    })
    .await?;
    Ok(HttpResponse::Ok().json(articles))
}

#[instrument(level = "info", skip_all)]
async fn scrape(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let report = state.scraper.run(Arc::clone(&state.db)).await?;
    info!(
        source = state.scraper.source_url(),
        stored = report.stored,
        failed = report.failed,
        "Scrape request served"
    );
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(SCRAPE_COMPLETE))
}

async fn get_article(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let article = with_db(&state, move |db| db.get_article(&id)).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn list_article_notes(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let notes = with_db(&state, move |db| db.list_notes_for_article(&id)).await?;
    Ok(HttpResponse::Ok().json(notes))
}

async fn get_note(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let note = with_db(&state, move |db| db.get_note(&id)).await?;
    Ok(HttpResponse::Ok().json(note))
}

async fn save_article(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let article = with_db(&state, move |db| db.mark_saved(&id)).await?;
    Ok(HttpResponse::Ok().json(article))
}

async fn unsave_article(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let article = with_db(&state, move |db| db.unsave(&id)).await?;
    Ok(HttpResponse::Ok().json(article))
}

/// Accepts `{"text": ...}` as JSON or as a urlencoded form.
#[instrument(level = "info", skip_all, fields(article_id = %path.as_str()))]
async fn create_note(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: Either<web::Json<NotePayload>, web::Form<NotePayload>>,
) -> AppResult<HttpResponse> {
    let article_id = path.into_inner();
    let body = match payload {
        Either::Left(json) => json.into_inner().text,
        Either::Right(form) => form.into_inner().text,
    };

    let article = with_db(&state, move |db| {
        // refuse before inserting so a bad id leaves no orphan note behind
        db.get_article(&article_id)?;
        let note = db.create_note(&body, &article_id)?;
        db.append_note(&article_id, &note.id)
    })
    .await?;
    Ok(HttpResponse::Ok().json(article))
}

#[instrument(level = "info", skip_all)]
async fn delete_note(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (note_id, article_id) = path.into_inner();
    with_db(&state, move |db| {
        db.delete_note(&note_id)?;
        db.detach_note(&article_id, &note_id)?;
        Ok::<_, AppError>(())
    })
    .await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(NOTE_DELETED))
}
