//! Raw HTML retrieval.
//!
//! One GET per call, no retries. Any transport failure or non-2xx status is
//! reported as [`AppError::Network`].

use crate::error::{AppError, AppResult};
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Build the HTTP client used for scraping.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> AppResult<Client> {
    let mut builder = Client::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))
}

/// Fetch `url` and return its body as text.
#[instrument(level = "info", skip(client))]
pub async fn fetch_html(client: &Client, url: &str) -> AppResult<String> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::network(url, e))?;

    let status = response.status();
    let html = response
        .text()
        .await
        .map_err(|e| AppError::network(url, e))?;

    info!(status = status.as_u16(), bytes = html.len(), "Fetched page");
    debug!(preview = %truncate_for_log(&html, 200), "Page body");
    Ok(html)
}
