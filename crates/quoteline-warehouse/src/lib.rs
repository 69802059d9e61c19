//! # Quoteline Warehouse
//!
//! DuckDB-backed store for company profiles, latest quotes, the append-only
//! quote history and the watch-list.
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `stocks` | Company profile per symbol |
//! | `quotes_latest` | Latest quote per symbol, overwritten in place |
//! | `quotes_history` | One immutable point per `(symbol, collected_ts)` |
//! | `watchlist` | Symbols ingested when no override is given |
//! | `schema_migrations` | Applied migration versions |
//!
//! ## Writes
//!
//! Ingestion writes go through a [`RoundSession`]: one pooled connection per
//! round, one transaction per symbol. Watch-list maintenance and purges run in
//! their own transactions on short-lived connections.
//!
//! ```rust,no_run
//! use quoteline_warehouse::{Warehouse, WarehouseConfig};
//!
//! let warehouse = Warehouse::open(WarehouseConfig::in_memory())?;
//! warehouse.add_to_watchlist("AAPL", Some(1))?;
//! assert_eq!(warehouse.watchlist_symbols()?, vec![String::from("AAPL")]);
//! # Ok::<(), quoteline_warehouse::WarehouseError>(())
//! ```

pub mod duckdb;
pub mod migrations;
pub mod models;
pub mod session;

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::PathBuf;

use ::duckdb::{params, Connection, Row};
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection, StoreLocation};
pub use models::{
    HistoryPoint, LatestQuoteRecord, PriceFields, ProfileRecord, PurgeReport, ReconcileReport,
    StoredProfile, StoredQuote, WatchEntry,
};
pub use session::RoundSession;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while preparing the database directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The caller passed a value the store refuses to act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Configuration for the store.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Database file or in-memory instance.
    pub location: StoreLocation,
    /// Maximum number of idle connections kept by the pool.
    pub max_pool_size: usize,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::at_path(resolve_quoteline_home().join("quoteline.duckdb"))
    }
}

impl WarehouseConfig {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            max_pool_size: 4,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            max_pool_size: 4,
        }
    }
}

/// The store handle shared by the ingestion pipeline and the read commands.
#[derive(Clone)]
pub struct Warehouse {
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open the store, creating parent directories and applying migrations.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        if let StoreLocation::File(path) = &config.location {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.location, config.max_pool_size)?;
        let warehouse = Self { manager };
        warehouse.initialize()?;
        tracing::debug!(location = %warehouse.location(), "store opened");
        Ok(warehouse)
    }

    /// Apply pending schema migrations.
    pub fn initialize(&self) -> Result<(), WarehouseError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        Ok(())
    }

    pub fn location(&self) -> &StoreLocation {
        self.manager.location()
    }

    /// Open the connection an ingestion round writes through.
    pub fn session(&self) -> Result<RoundSession, WarehouseError> {
        Ok(RoundSession::new(self.manager.acquire()?))
    }

    // ------------------------------------------------------------------
    // Watch-list
    // ------------------------------------------------------------------

    /// Watch-list symbols: position ascending with NULLs last, then creation time.
    pub fn watchlist_symbols(&self) -> Result<Vec<String>, WarehouseError> {
        Ok(self
            .watchlist_entries()?
            .into_iter()
            .map(|entry| entry.symbol)
            .collect())
    }

    /// Watch-list entries in ingestion order.
    pub fn watchlist_entries(&self) -> Result<Vec<WatchEntry>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, position, CAST(created_at AS VARCHAR) \
             FROM watchlist \
             ORDER BY \
               CASE WHEN position IS NULL THEN 1 ELSE 0 END, \
               position, \
               created_at, \
               symbol",
        )?;
        let rows = statement.query_map([], |row| {
            Ok(WatchEntry {
                symbol: row.get(0)?,
                position: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Profiles of watched symbols, in watch-list order.
    ///
    /// Every watched symbol has at least a stub profile, so the join drops nothing.
    pub fn watchlist_profiles(&self) -> Result<Vec<StoredProfile>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT s.symbol, s.name, s.currency, s.exchange, s.industry, \
                    CAST(s.updated_at AS VARCHAR) \
             FROM watchlist w \
             JOIN stocks s ON s.symbol = w.symbol \
             ORDER BY \
               CASE WHEN w.position IS NULL THEN 1 ELSE 0 END, \
               w.position, \
               w.created_at, \
               w.symbol",
        )?;
        let rows = statement.query_map([], read_profile)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Add a symbol to the watch-list.
    ///
    /// A profile stub is created when the symbol has never been ingested.
    /// Returns `false` when the symbol was already watched; its entry is left as is.
    pub fn add_to_watchlist(
        &self,
        symbol: &str,
        position: Option<i64>,
    ) -> Result<bool, WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<bool, WarehouseError> {
            ensure_profile_stub(&connection, symbol)?;
            let watched: i64 = connection.query_row(
                "SELECT COUNT(*) FROM watchlist WHERE symbol = ?",
                params![symbol],
                |row| row.get(0),
            )?;
            if watched > 0 {
                return Ok(false);
            }
            connection.execute(
                "INSERT INTO watchlist (symbol, position, created_at) \
                 VALUES (?, ?, CURRENT_TIMESTAMP)",
                params![symbol, position],
            )?;
            Ok(true)
        })();
        finalize_transaction(&connection, result)
    }

    /// Remove a symbol from the watch-list, keeping its profile and history.
    pub fn remove_from_watchlist(&self, symbol: &str) -> Result<bool, WarehouseError> {
        let connection = self.manager.acquire()?;
        let removed = connection.execute("DELETE FROM watchlist WHERE symbol = ?", params![symbol])?;
        Ok(removed > 0)
    }

    /// Make the watch-list exactly `symbols`, in order, with positions `1..=N`.
    ///
    /// Entries that stay keep their creation time; duplicates in the input keep
    /// their first position.
    pub fn replace_watchlist(&self, symbols: &[String]) -> Result<usize, WarehouseError> {
        let mut seen = BTreeSet::new();
        let ordered: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<usize, WarehouseError> {
            let current = {
                let mut statement = connection.prepare("SELECT symbol FROM watchlist")?;
                let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            for stale in current.iter().filter(|s| !seen.contains(s.as_str())) {
                connection.execute("DELETE FROM watchlist WHERE symbol = ?", params![stale])?;
            }

            for (index, symbol) in ordered.iter().enumerate() {
                let position = i64::try_from(index + 1).map_err(|_| {
                    WarehouseError::InvalidArgument(String::from("watch-list is too long"))
                })?;
                ensure_profile_stub(&connection, symbol)?;
                connection.execute(
                    "INSERT INTO watchlist (symbol, position, created_at) \
                     VALUES (?, ?, CURRENT_TIMESTAMP) \
                     ON CONFLICT (symbol) DO UPDATE SET position = excluded.position",
                    params![symbol, position],
                )?;
            }
            Ok(ordered.len())
        })();
        finalize_transaction(&connection, result)
    }

    /// Delete a symbol everywhere: history, latest quote, watch entry and profile.
    pub fn purge_symbol(&self, symbol: &str) -> Result<PurgeReport, WarehouseError> {
        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<PurgeReport, WarehouseError> {
            Ok(PurgeReport {
                history_rows: connection
                    .execute("DELETE FROM quotes_history WHERE symbol = ?", params![symbol])?,
                latest_rows: connection
                    .execute("DELETE FROM quotes_latest WHERE symbol = ?", params![symbol])?,
                watch_rows: connection
                    .execute("DELETE FROM watchlist WHERE symbol = ?", params![symbol])?,
                profile_rows: connection
                    .execute("DELETE FROM stocks WHERE symbol = ?", params![symbol])?,
            })
        })();
        let report = finalize_transaction(&connection, result)?;
        tracing::info!(symbol, rows = report.total(), "purged symbol");
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Read queries
    // ------------------------------------------------------------------

    /// Profiles ordered by symbol.
    pub fn list_profiles(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<StoredProfile>, WarehouseError> {
        let limit = positive_limit(limit)?;
        let offset = i64::try_from(offset)
            .map_err(|_| WarehouseError::InvalidArgument(String::from("offset is too large")))?;
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, name, currency, exchange, industry, CAST(updated_at AS VARCHAR) \
             FROM stocks ORDER BY symbol LIMIT ? OFFSET ?",
        )?;
        let rows = statement.query_map(params![limit, offset], read_profile)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn profile(&self, symbol: &str) -> Result<Option<StoredProfile>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, name, currency, exchange, industry, CAST(updated_at AS VARCHAR) \
             FROM stocks WHERE symbol = ?",
        )?;
        let mut rows = statement.query_map(params![symbol], read_profile)?;
        Ok(rows.next().transpose()?)
    }

    pub fn latest_quote(&self, symbol: &str) -> Result<Option<StoredQuote>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, current_price, high_price, low_price, open_price, previous_close, \
                    quote_ts, CAST(updated_at AS VARCHAR) \
             FROM quotes_latest WHERE symbol = ?",
        )?;
        let mut rows = statement.query_map(params![symbol], read_quote)?;
        Ok(rows.next().transpose()?)
    }

    /// Every latest quote, ordered by symbol.
    pub fn latest_quotes(&self) -> Result<Vec<StoredQuote>, WarehouseError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, current_price, high_price, low_price, open_price, previous_close, \
                    quote_ts, CAST(updated_at AS VARCHAR) \
             FROM quotes_latest ORDER BY symbol",
        )?;
        let rows = statement.query_map([], read_quote)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The most recent `limit` history points, oldest first (chart order).
    pub fn quote_history(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<HistoryPoint>, WarehouseError> {
        let limit = positive_limit(limit)?;
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT symbol, collected_ts, quote_ts, current_price, high_price, low_price, \
                    open_price, previous_close \
             FROM ( \
               SELECT * FROM quotes_history WHERE symbol = ? \
               ORDER BY collected_ts DESC LIMIT ? \
             ) ORDER BY collected_ts ASC",
        )?;
        let rows = statement.query_map(params![symbol, limit], |row| {
            Ok(HistoryPoint {
                symbol: row.get(0)?,
                collected_ts: row.get(1)?,
                quote_ts: row.get(2)?,
                prices: read_prices(row, 3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of history points stored for `symbol`.
    pub fn history_len(&self, symbol: &str) -> Result<usize, WarehouseError> {
        let connection = self.manager.acquire()?;
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM quotes_history WHERE symbol = ?",
            params![symbol],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

/// Commit on success, roll back on failure.
pub(crate) fn finalize_transaction<T>(
    connection: &Connection,
    result: Result<T, WarehouseError>,
) -> Result<T, WarehouseError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = connection.execute_batch("ROLLBACK") {
                tracing::warn!(error = %rollback_error, "rollback failed");
            }
            Err(error)
        }
    }
}

fn ensure_profile_stub(connection: &Connection, symbol: &str) -> Result<(), WarehouseError> {
    connection.execute(
        "INSERT OR IGNORE INTO stocks (symbol, updated_at) VALUES (?, CURRENT_TIMESTAMP)",
        params![symbol],
    )?;
    Ok(())
}

fn positive_limit(limit: usize) -> Result<i64, WarehouseError> {
    if limit == 0 {
        return Err(WarehouseError::InvalidArgument(String::from(
            "limit must be greater than zero",
        )));
    }
    i64::try_from(limit)
        .map_err(|_| WarehouseError::InvalidArgument(String::from("limit is too large")))
}

fn read_prices(row: &Row<'_>, first: usize) -> Result<PriceFields, ::duckdb::Error> {
    Ok(PriceFields {
        current_price: row.get(first)?,
        high_price: row.get(first + 1)?,
        low_price: row.get(first + 2)?,
        open_price: row.get(first + 3)?,
        previous_close: row.get(first + 4)?,
    })
}

fn read_profile(row: &Row<'_>) -> Result<StoredProfile, ::duckdb::Error> {
    Ok(StoredProfile {
        symbol: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        exchange: row.get(3)?,
        industry: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn read_quote(row: &Row<'_>) -> Result<StoredQuote, ::duckdb::Error> {
    Ok(StoredQuote {
        symbol: row.get(0)?,
        prices: read_prices(row, 1)?,
        quote_ts: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Resolve the quoteline home directory from environment or default.
fn resolve_quoteline_home() -> PathBuf {
    if let Some(path) = env::var_os("QUOTELINE_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".quoteline");
    }

    PathBuf::from(".quoteline")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn profile(symbol: &str, name: Option<&str>) -> ProfileRecord {
        ProfileRecord {
            symbol: symbol.to_string(),
            name: name.map(str::to_string),
            currency: Some("USD".to_string()),
            exchange: Some("NASDAQ".to_string()),
            industry: Some("Technology".to_string()),
        }
    }

    fn quote(symbol: &str, current: f64, quote_ts: i64) -> LatestQuoteRecord {
        LatestQuoteRecord {
            symbol: symbol.to_string(),
            prices: PriceFields {
                current_price: Some(current),
                high_price: Some(current + 1.0),
                low_price: Some(current - 1.0),
                open_price: Some(current),
                previous_close: Some(current - 0.5),
            },
            quote_ts,
        }
    }

    #[test]
    fn opens_file_store_and_creates_parent_directories() {
        let temp = tempdir().expect("tempdir");
        let db_path = temp.path().join("nested").join("quoteline.duckdb");

        let warehouse = Warehouse::open(WarehouseConfig::at_path(&db_path)).expect("open");

        assert!(db_path.exists());
        assert_eq!(warehouse.location(), &StoreLocation::File(db_path));
        assert!(warehouse.watchlist_symbols().expect("watchlist").is_empty());
    }

    #[test]
    fn reconcile_writes_profile_quote_and_history() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        let session = warehouse.session().expect("session");

        let report = session
            .reconcile(&profile("AAPL", Some("Apple Inc")), &quote("AAPL", 190.0, 1_700_000_000), 1_700_000_100)
            .expect("reconcile");

        assert!(report.history_inserted);
        let stored = warehouse.profile("AAPL").expect("profile").expect("row");
        assert_eq!(stored.name.as_deref(), Some("Apple Inc"));
        let latest = warehouse.latest_quote("AAPL").expect("quote").expect("row");
        assert_eq!(latest.quote_ts, 1_700_000_000);
        assert_eq!(latest.prices.current_price, Some(190.0));
        assert_eq!(warehouse.history_len("AAPL").expect("history"), 1);
    }

    #[test]
    fn profile_upsert_overwrites_with_nulls() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        let session = warehouse.session().expect("session");
        session
            .reconcile(&profile("MSFT", Some("Microsoft")), &quote("MSFT", 400.0, 10), 100)
            .expect("first");

        let sparse = ProfileRecord {
            symbol: "MSFT".to_string(),
            ..ProfileRecord::default()
        };
        session
            .reconcile(&sparse, &quote("MSFT", 401.0, 11), 101)
            .expect("second");

        let stored = warehouse.profile("MSFT").expect("profile").expect("row");
        assert_eq!(stored.name, None);
        assert_eq!(stored.currency, None);
        assert_eq!(stored.industry, None);
    }

    #[test]
    fn duplicate_collection_instant_keeps_one_history_point() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        let session = warehouse.session().expect("session");

        let first = session
            .reconcile(&profile("TSLA", Some("Tesla")), &quote("TSLA", 250.0, 1), 500)
            .expect("first");
        let second = session
            .reconcile(&profile("TSLA", Some("Tesla")), &quote("TSLA", 251.0, 2), 500)
            .expect("second");

        assert!(first.history_inserted);
        assert!(!second.history_inserted);
        assert_eq!(warehouse.history_len("TSLA").expect("history"), 1);
        let latest = warehouse.latest_quote("TSLA").expect("quote").expect("row");
        assert_eq!(latest.prices.current_price, Some(251.0));
        assert_eq!(latest.quote_ts, 2);
    }

    #[test]
    fn failed_reconcile_rolls_back_every_table() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        {
            let connection = warehouse.manager.acquire().expect("connection");
            connection
                .execute_batch("DROP TABLE quotes_history")
                .expect("drop history");
        }

        let session = warehouse.session().expect("session");
        let error = session
            .reconcile(&profile("NVDA", Some("Nvidia")), &quote("NVDA", 900.0, 3), 600)
            .expect_err("history table is gone");
        assert!(matches!(error, WarehouseError::DuckDb(_)));

        assert!(warehouse.profile("NVDA").expect("profile").is_none());
        assert!(warehouse.latest_quote("NVDA").expect("quote").is_none());
    }

    #[test]
    fn reconcile_rejects_mismatched_symbols() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        let session = warehouse.session().expect("session");

        let error = session
            .reconcile(&profile("AAPL", None), &quote("MSFT", 1.0, 1), 1)
            .expect_err("must reject");
        assert!(matches!(error, WarehouseError::InvalidArgument(_)));
    }

    #[test]
    fn watchlist_orders_by_position_with_nulls_last() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        warehouse.add_to_watchlist("A", Some(2)).expect("add A");
        warehouse.add_to_watchlist("B", None).expect("add B");
        warehouse.add_to_watchlist("C", Some(1)).expect("add C");

        assert_eq!(
            warehouse.watchlist_symbols().expect("symbols"),
            vec!["C".to_string(), "A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn watchlist_profiles_follow_watchlist_order() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        warehouse.add_to_watchlist("MSFT", None).expect("add MSFT");
        warehouse.add_to_watchlist("AAPL", Some(1)).expect("add AAPL");
        let session = warehouse.session().expect("session");
        session
            .reconcile(&profile("MSFT", Some("Microsoft")), &quote("MSFT", 400.0, 1), 10)
            .expect("reconcile");
        session
            .reconcile(&profile("IBM", Some("IBM")), &quote("IBM", 180.0, 1), 10)
            .expect("unwatched symbol");

        let profiles = warehouse.watchlist_profiles().expect("profiles");
        let rows: Vec<(&str, Option<&str>)> = profiles
            .iter()
            .map(|p| (p.symbol.as_str(), p.name.as_deref()))
            .collect();
        assert_eq!(rows, vec![("AAPL", None), ("MSFT", Some("Microsoft"))]);
    }

    #[test]
    fn adding_a_watched_symbol_is_idempotent_and_creates_a_stub_profile() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");

        assert!(warehouse.add_to_watchlist("AMD", None).expect("first add"));
        assert!(!warehouse.add_to_watchlist("AMD", Some(4)).expect("second add"));

        let entries = warehouse.watchlist_entries().expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].position, None);
        let stub = warehouse.profile("AMD").expect("profile").expect("stub row");
        assert_eq!(stub.name, None);
    }

    #[test]
    fn replace_watchlist_assigns_positions_in_order() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        warehouse.add_to_watchlist("OLD", Some(1)).expect("add");
        warehouse.add_to_watchlist("KO", Some(9)).expect("add");

        let seeded = warehouse
            .replace_watchlist(&["PEP".to_string(), "KO".to_string(), "PEP".to_string()])
            .expect("replace");

        assert_eq!(seeded, 2);
        let entries = warehouse.watchlist_entries().expect("entries");
        let pairs: Vec<(String, Option<i64>)> = entries
            .into_iter()
            .map(|entry| (entry.symbol, entry.position))
            .collect();
        assert_eq!(
            pairs,
            vec![("PEP".to_string(), Some(1)), ("KO".to_string(), Some(2))]
        );
    }

    #[test]
    fn purge_removes_symbol_from_every_table() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        warehouse.add_to_watchlist("IBM", Some(1)).expect("watch");
        let session = warehouse.session().expect("session");
        session
            .reconcile(&profile("IBM", Some("IBM")), &quote("IBM", 180.0, 5), 700)
            .expect("reconcile");
        session
            .reconcile(&profile("IBM", Some("IBM")), &quote("IBM", 181.0, 6), 701)
            .expect("reconcile");

        let report = warehouse.purge_symbol("IBM").expect("purge");

        assert_eq!(
            report,
            PurgeReport {
                history_rows: 2,
                latest_rows: 1,
                watch_rows: 1,
                profile_rows: 1,
            }
        );
        assert!(warehouse.profile("IBM").expect("profile").is_none());
        assert_eq!(warehouse.history_len("IBM").expect("history"), 0);
    }

    #[test]
    fn history_returns_latest_points_in_chart_order() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        let session = warehouse.session().expect("session");
        for (offset, price) in [10.0, 11.0, 12.0, 13.0].into_iter().enumerate() {
            let collected = 1_000 + offset as i64;
            session
                .reconcile(&profile("V", Some("Visa")), &quote("V", price, collected), collected)
                .expect("reconcile");
        }

        let history = warehouse.quote_history("V", 2).expect("history");
        let collected: Vec<i64> = history.iter().map(|point| point.collected_ts).collect();
        assert_eq!(collected, vec![1_002, 1_003]);

        let error = warehouse.quote_history("V", 0).expect_err("zero limit");
        assert!(matches!(error, WarehouseError::InvalidArgument(_)));
    }

    #[test]
    fn list_profiles_pages_by_symbol() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open");
        warehouse
            .replace_watchlist(&["MSFT".to_string(), "AAPL".to_string(), "GOOGL".to_string()])
            .expect("seed");

        let page = warehouse.list_profiles(2, 1).expect("page");
        let symbols: Vec<&str> = page.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["GOOGL", "MSFT"]);
    }
}
