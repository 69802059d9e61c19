//! CLI argument definitions for quoteline.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ingest` | Fetch profiles and quotes and reconcile them into the store |
//! | `watchlist` | Inspect and maintain the symbols ingested by default |
//! | `show` | Read stored profiles, quotes and history as JSON |
//! | `search` | Look up provider symbols to add to the watch-list |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--db-path` | `$QUOTELINE_HOME/quoteline.duckdb` | Store location (`QUOTELINE_DB_PATH`) |
//! | `--log-level` | `info` | Log filter; `RUST_LOG` wins when set |
//! | `--log-format` | `pretty` | Log output format (pretty, json) |
//!
//! # Examples
//!
//! ```bash
//! # Seed the default watch-list, then ingest it every five minutes
//! quoteline watchlist seed
//! quoteline ingest --interval-secs 300
//!
//! # One round over an explicit list
//! quoteline ingest --symbols "AAPL, TSLA"
//!
//! # Chart data for one symbol
//! quoteline show history AAPL --limit 200
//!
//! # Find the ticker for a company, then watch it
//! quoteline search "berkshire"
//! quoteline watchlist add BRK.B
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Market-data ingestion into a local DuckDB store.
#[derive(Debug, Parser)]
#[command(
    name = "quoteline",
    author,
    version,
    about = "Ingest company profiles and quotes into a local store"
)]
pub struct Cli {
    /// Store file; defaults to `$QUOTELINE_HOME/quoteline.duckdb`.
    #[arg(long, global = true, env = "QUOTELINE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Log filter directive used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Log output format; logs always go to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run ingestion rounds and print each round summary.
    Ingest(IngestArgs),
    /// Maintain the watch-list.
    Watchlist {
        #[command(subcommand)]
        command: WatchlistCommand,
    },
    /// Read stored data.
    Show {
        #[command(subcommand)]
        command: ShowCommand,
    },
    /// Look up symbols at the quote provider.
    Search(SearchArgs),
}

/// Connection settings for the quote provider.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Finnhub API token.
    #[arg(long, env = "FINNHUB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Finnhub API base URL.
    #[arg(long, env = "FINNHUB_BASE_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Client-side request budget per minute.
    #[arg(long, default_value_t = 60)]
    pub requests_per_minute: u32,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Company name, ISIN or partial ticker.
    pub query: String,

    /// Maximum number of matches to print.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Comma or space separated symbols; replaces the watch-list for this run.
    #[arg(long)]
    pub symbols: Option<String>,

    /// Retries per fetch after the first attempt.
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Base backoff delay in milliseconds, doubled per retry.
    #[arg(long, default_value_t = 1_000)]
    pub backoff_ms: u64,

    /// Pause between symbols in milliseconds.
    #[arg(long, default_value_t = 500)]
    pub symbol_delay_ms: u64,

    /// Seconds between rounds; 0 runs a single round.
    #[arg(long, default_value_t = 0)]
    pub interval_secs: u64,

    /// Stop after this many rounds in interval mode.
    #[arg(long)]
    pub rounds: Option<usize>,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Subcommand)]
pub enum WatchlistCommand {
    /// List watched symbols in ingestion order.
    List,
    /// Stored profiles of watched symbols, in ingestion order.
    Stocks,
    /// Watch a symbol.
    Add {
        symbol: String,
        /// Explicit ordering position; unpositioned entries come last.
        #[arg(long)]
        position: Option<i64>,
    },
    /// Stop watching a symbol, keeping its data.
    Remove { symbol: String },
    /// Delete a symbol and all of its stored data.
    Purge { symbol: String },
    /// Replace the watch-list with the given symbols, or the default top-50 list.
    Seed { symbols: Vec<String> },
}

#[derive(Debug, Subcommand)]
pub enum ShowCommand {
    /// Stored profiles ordered by symbol.
    Stocks {
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// One stored profile.
    Stock { symbol: String },
    /// One latest quote.
    Quote { symbol: String },
    /// Every latest quote.
    Quotes,
    /// Most recent history points, oldest first.
    History {
        symbol: String,
        #[arg(long, default_value_t = 200)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_defaults_match_the_scheduler_defaults() {
        let cli = Cli::try_parse_from(["quoteline", "ingest", "--api-key", "k"]).expect("parse");
        let Command::Ingest(args) = cli.command else {
            panic!("expected ingest");
        };
        assert_eq!(args.retries, 3);
        assert_eq!(args.backoff_ms, 1_000);
        assert_eq!(args.symbol_delay_ms, 500);
        assert_eq!(args.interval_secs, 0);
        assert_eq!(args.rounds, None);
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "quoteline",
            "show",
            "history",
            "aapl",
            "--limit",
            "5",
            "--db-path",
            "/tmp/q.duckdb",
            "--log-format",
            "json",
        ])
        .expect("parse");

        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/q.duckdb")));
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(
            cli.command,
            Command::Show {
                command: ShowCommand::History { ref symbol, limit: 5 }
            } if symbol == "aapl"
        ));
    }

    #[test]
    fn search_shares_the_provider_flags() {
        let cli = Cli::try_parse_from([
            "quoteline",
            "search",
            "apple inc",
            "--limit",
            "3",
            "--api-key",
            "k",
            "--requests-per-minute",
            "30",
        ])
        .expect("parse");
        let Command::Search(args) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.query, "apple inc");
        assert_eq!(args.limit, 3);
        assert_eq!(args.source.api_key.as_deref(), Some("k"));
        assert_eq!(args.source.requests_per_minute, 30);
    }

    #[test]
    fn watchlist_stocks_is_a_subcommand() {
        let cli = Cli::try_parse_from(["quoteline", "watchlist", "stocks"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Watchlist {
                command: WatchlistCommand::Stocks
            }
        ));
    }

    #[test]
    fn watchlist_add_takes_an_optional_position() {
        let cli = Cli::try_parse_from(["quoteline", "watchlist", "add", "msft", "--position", "3"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Watchlist {
                command: WatchlistCommand::Add { position: Some(3), .. }
            }
        ));
    }
}
