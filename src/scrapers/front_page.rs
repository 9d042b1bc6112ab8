//! Front page extractor.
//!
//! Every `<article>` element on the page becomes one [`ArticleCandidate`]:
//!
//! | Field | Source inside the block |
//! |-------|-------------------------|
//! | `title` | text of the first `h1`..`h6` |
//! | `summary` | first `li` when the block has a `ul`, else the first `p` |
//! | `link` | site origin + `href` of the first anchor that has one |
//!
//! Missing elements never fail the block. Title and summary fall back to an
//! empty string and a block without an anchor links to the origin itself.
//! Absolute `href`s are kept as they are instead of being prefixed, and
//! protocol-relative ones borrow the origin's scheme.

use crate::models::ArticleCandidate;
use crate::utils::normalize_whitespace;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector parses")
}

static ARTICLE: Lazy<Selector> = Lazy::new(|| selector("article"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1, h2, h3, h4, h5, h6"));
static LIST: Lazy<Selector> = Lazy::new(|| selector("ul"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("li"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// Parse a front page into article candidates, in document order.
#[instrument(level = "info", skip_all, fields(bytes = html.len(), %origin))]
pub fn extract_articles(html: &str, origin: &str) -> Vec<ArticleCandidate> {
    let document = Html::parse_document(html);
    let candidates: Vec<ArticleCandidate> = document
        .select(&ARTICLE)
        .map(|block| extract_block(block, origin))
        .collect();

    debug!(count = candidates.len(), "Extracted article candidates");
    candidates
}

fn extract_block(block: ElementRef<'_>, origin: &str) -> ArticleCandidate {
    let title = first_text(block, &HEADING);

    let summary = if block.select(&LIST).next().is_some() {
        first_text(block, &LIST_ITEM)
    } else {
        first_text(block, &PARAGRAPH)
    };

    let href = block
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"));

    ArticleCandidate {
        title,
        summary,
        link: resolve_link(origin, href),
    }
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> String {
    block
        .select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Join the site origin with an anchor's `href`.
///
/// Relative hrefs are appended to the origin verbatim. An absolute http(s)
/// URL is returned unchanged and a protocol-relative one (`//host/...`) takes
/// the origin's scheme. No href at all yields the origin alone.
pub fn resolve_link(origin: &str, href: Option<&str>) -> String {
    match href.map(str::trim) {
        None => origin.to_string(),
        Some(href) if href.starts_with("//") => {
            let scheme = Url::parse(origin)
                .map(|o| o.scheme().to_string())
                .unwrap_or_else(|_| "https".to_string());
            format!("{scheme}:{href}")
        }
        Some(href) => match Url::parse(href) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => href.to_string(),
            _ => format!("{origin}{href}"),
        },
    }
}
