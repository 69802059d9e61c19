//! Turns parsed arguments into the explicit values the core consumes.

use std::path::PathBuf;
use std::time::Duration;

use quoteline_core::{FinnhubAdapter, IngestSettings, RateBudget};
use quoteline_warehouse::WarehouseConfig;

use crate::cli::{IngestArgs, SourceArgs};
use crate::error::CliError;

pub fn warehouse_config(db_path: Option<&PathBuf>) -> WarehouseConfig {
    match db_path {
        Some(path) => WarehouseConfig::at_path(path.clone()),
        None => WarehouseConfig::default(),
    }
}

pub fn ingest_settings(args: &IngestArgs) -> IngestSettings {
    IngestSettings {
        max_retries: args.retries,
        retry_base_delay: Duration::from_millis(args.backoff_ms),
        symbol_delay: Duration::from_millis(args.symbol_delay_ms),
        interval: Duration::from_secs(args.interval_secs),
    }
}

/// The Finnhub adapter described by the provider flags.
///
/// Fails before anything else happens when the token is missing.
pub fn finnhub_adapter(args: &SourceArgs) -> Result<FinnhubAdapter, CliError> {
    let mut adapter = FinnhubAdapter::new(api_key(args)?)
        .with_timeout(Duration::from_millis(args.timeout_ms))
        .with_rate_budget(RateBudget::per_minute(args.requests_per_minute));
    if let Some(base_url) = &args.base_url {
        adapter = adapter.with_base_url(base_url.as_str());
    }
    Ok(adapter)
}

/// The Finnhub token, which neither ingestion nor search can run without.
pub fn api_key(args: &SourceArgs) -> Result<String, CliError> {
    args.api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            CliError::Config(String::from(
                "missing Finnhub API key; set FINNHUB_API_KEY or pass --api-key",
            ))
        })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn ingest_args(extra: &[&str]) -> IngestArgs {
        let argv = ["quoteline", "ingest"].into_iter().chain(extra.iter().copied());
        match Cli::try_parse_from(argv).expect("parse").command {
            Command::Ingest(args) => args,
            _ => panic!("expected ingest"),
        }
    }

    #[test]
    fn flags_become_explicit_settings() {
        let args = ingest_args(&[
            "--retries",
            "5",
            "--backoff-ms",
            "250",
            "--symbol-delay-ms",
            "0",
            "--interval-secs",
            "60",
        ]);
        let settings = ingest_settings(&args);

        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.retry_base_delay, Duration::from_millis(250));
        assert_eq!(settings.symbol_delay, Duration::ZERO);
        assert_eq!(settings.interval, Duration::from_secs(60));
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let args = ingest_args(&["--api-key", "  "]);
        let error = api_key(&args.source).expect_err("blank key must fail");
        assert_eq!(error.exit_code(), 2);
        assert!(finnhub_adapter(&args.source).is_err());
    }

    #[test]
    fn explicit_db_path_wins_over_the_default() {
        let path = PathBuf::from("/tmp/explicit.duckdb");
        let config = warehouse_config(Some(&path));
        assert_eq!(config.location.to_string(), "/tmp/explicit.duckdb");
    }
}
