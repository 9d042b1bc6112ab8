//! Command-line interface definitions for the headline server.
//!
//! Every option can also come from an environment variable or from the YAML
//! file passed with `--config`. Precedence is flag/env, then file, then the
//! built-in default (see [`crate::config::Config::resolve`]).

use clap::Parser;

/// Command-line arguments for the headline server.
///
/// # Examples
///
/// ```sh
/// # Defaults: port 3000, ./news_headlines.db, scrape nytimes.com
/// news_headlines
///
/// # Custom port and database file
/// PORT=8080 news_headlines --database /var/lib/news/headlines.db
///
/// # Everything from a file
/// news_headlines --config ./news_headlines.yaml
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH")]
    pub database: Option<String>,

    /// Front page to scrape
    #[arg(long, env = "SOURCE_URL")]
    pub source_url: Option<String>,

    /// Origin prefixed to relative article links
    #[arg(long, env = "LINK_ORIGIN")]
    pub link_origin: Option<String>,

    /// Timeout for the front page request, in seconds (none by default)
    #[arg(long, env = "FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_headlines",
            "--port",
            "8080",
            "--database",
            "/tmp/news.db",
            "--link-origin",
            "https://example.com",
        ]);

        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.database.as_deref(), Some("/tmp/news.db"));
        assert_eq!(cli.link_origin.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["news_headlines", "-c", "conf.yaml", "-p", "4000", "-d", "x.db"]);

        assert_eq!(cli.config.as_deref(), Some("conf.yaml"));
        assert_eq!(cli.port, Some(4000));
        assert_eq!(cli.database.as_deref(), Some("x.db"));
    }
}
