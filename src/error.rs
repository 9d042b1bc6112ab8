//! Error taxonomy shared by the scraper, the store and the HTTP layer.
//!
//! Every fallible operation in the crate returns [`AppError`]. The HTTP layer
//! renders it through [`ResponseError`], so handlers can simply use `?`:
//!
//! | Variant | Meaning | Status |
//! |---------|---------|--------|
//! | [`AppError::Network`] | remote fetch failed or returned non-2xx | 502 |
//! | [`AppError::NotFound`] | unknown id on lookup, update or delete | 404 |
//! | [`AppError::Store`] | SQLite failure | 500 |
//! | [`AppError::Blocking`] | blocking-pool task was cancelled or panicked | 500 |
//! | [`AppError::Config`] | configuration could not be loaded | 500 |

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

/// Crate-wide result alias.
pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The source site could not be reached or answered with an error status.
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No row with the given id exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("background task failed: {0}")]
    Blocking(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn network<U: Into<String>>(url: U, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn article_not_found<I: Into<String>>(id: I) -> Self {
        Self::NotFound {
            entity: "article",
            id: id.into(),
        }
    }

    pub fn note_not_found<I: Into<String>>(id: I) -> Self {
        Self::NotFound {
            entity: "note",
            id: id.into(),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        Self::Blocking(e.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Blocking(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Network { .. } => StatusCode::BAD_GATEWAY,
            AppError::Store(_) | AppError::Blocking(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
    }
}
