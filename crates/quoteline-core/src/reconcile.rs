//! Per-symbol atomic write of profile, latest quote and history point.

use std::sync::Arc;

use quoteline_warehouse::{LatestQuoteRecord, ProfileRecord, RoundSession};

use crate::clock::Clock;
use crate::{CompanyProfile, IngestError, QuoteSnapshot, Symbol};

/// What one successful reconciliation stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub symbol: Symbol,
    pub quote_ts: i64,
    pub collected_ts: i64,
    /// `false` when a history point for this instant already existed.
    pub history_inserted: bool,
}

/// Turns one symbol's fetched records into a single store transaction.
///
/// The collection timestamp is taken from the writer's clock at call time,
/// not from the provider.
#[derive(Clone)]
pub struct ReconciliationWriter {
    clock: Arc<dyn Clock>,
}

impl ReconciliationWriter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Store `profile` and `quote` for `symbol` atomically.
    ///
    /// A quote without a provider timestamp is rejected before the store is touched.
    pub fn reconcile(
        &self,
        session: &RoundSession,
        symbol: &Symbol,
        profile: &CompanyProfile,
        quote: &QuoteSnapshot,
    ) -> Result<Reconciled, IngestError> {
        let quote_ts = quote
            .timestamp
            .ok_or_else(|| IngestError::MissingQuoteTimestamp {
                symbol: symbol.clone(),
            })?;

        let profile_record = ProfileRecord {
            symbol: symbol.as_str().to_owned(),
            name: profile.name.clone(),
            currency: profile.currency.clone(),
            exchange: profile.exchange.clone(),
            industry: profile.industry.clone(),
        };
        let quote_record = LatestQuoteRecord {
            symbol: symbol.as_str().to_owned(),
            prices: quote.prices(),
            quote_ts,
        };

        let collected_ts = self.clock.unix_seconds();
        let report = session.reconcile(&profile_record, &quote_record, collected_ts)?;
        if !report.history_inserted {
            tracing::debug!(
                symbol = %symbol,
                collected_ts,
                "history point already recorded for this instant"
            );
        }

        Ok(Reconciled {
            symbol: symbol.clone(),
            quote_ts,
            collected_ts: report.collected_ts,
            history_inserted: report.history_inserted,
        })
    }
}

impl std::fmt::Debug for ReconciliationWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationWriter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use quoteline_warehouse::{Warehouse, WarehouseConfig};

    use super::*;
    use crate::clock::ManualClock;
    use crate::FailureKind;

    fn quote(current: f64, timestamp: Option<i64>) -> QuoteSnapshot {
        QuoteSnapshot {
            current: Some(current),
            high: Some(current + 1.0),
            low: Some(current - 1.0),
            open: Some(current),
            previous_close: None,
            timestamp,
        }
    }

    fn profile(name: &str) -> CompanyProfile {
        CompanyProfile {
            name: Some(name.to_owned()),
            currency: Some(String::from("USD")),
            exchange: None,
            industry: None,
        }
    }

    #[test]
    fn same_instant_twice_keeps_one_history_row_and_last_quote() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open store");
        let writer = ReconciliationWriter::new(Arc::new(ManualClock::at(1_700_000_100)));
        let session = warehouse.session().expect("session");
        let symbol = Symbol::parse("AAPL").expect("symbol");

        let first = writer
            .reconcile(&session, &symbol, &profile("Apple"), &quote(100.0, Some(1)))
            .expect("first write");
        let second = writer
            .reconcile(&session, &symbol, &profile("Apple Inc."), &quote(101.0, Some(2)))
            .expect("second write");

        assert!(first.history_inserted);
        assert!(!second.history_inserted);
        assert_eq!(second.collected_ts, 1_700_000_100);
        assert_eq!(warehouse.history_len("AAPL").expect("count"), 1);

        let latest = warehouse.latest_quote("AAPL").expect("read").expect("row");
        assert_eq!(latest.prices.current_price, Some(101.0));
        assert_eq!(latest.quote_ts, 2);
        let stored = warehouse.profile("AAPL").expect("read").expect("row");
        assert_eq!(stored.name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn missing_timestamp_writes_nothing() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open store");
        let writer = ReconciliationWriter::new(Arc::new(ManualClock::at(10)));
        let session = warehouse.session().expect("session");
        let symbol = Symbol::parse("MSFT").expect("symbol");

        let error = writer
            .reconcile(&session, &symbol, &profile("Microsoft"), &quote(1.0, None))
            .expect_err("must fail");

        assert_eq!(error.kind(), FailureKind::MissingQuoteTimestamp);
        assert!(warehouse.profile("MSFT").expect("read").is_none());
        assert!(warehouse.latest_quote("MSFT").expect("read").is_none());
        assert_eq!(warehouse.history_len("MSFT").expect("count"), 0);
    }

    #[test]
    fn stale_provider_timestamp_still_overwrites() {
        let warehouse = Warehouse::open(WarehouseConfig::in_memory()).expect("open store");
        let clock = ManualClock::at(1_000);
        let writer = ReconciliationWriter::new(Arc::new(clock.clone()));
        let session = warehouse.session().expect("session");
        let symbol = Symbol::parse("TSLA").expect("symbol");

        writer
            .reconcile(&session, &symbol, &profile("Tesla"), &quote(250.0, Some(500)))
            .expect("newer quote");
        clock.set(1_060);
        writer
            .reconcile(&session, &symbol, &profile("Tesla"), &quote(240.0, Some(400)))
            .expect("older quote");

        let latest = warehouse.latest_quote("TSLA").expect("read").expect("row");
        assert_eq!(latest.quote_ts, 400);
        assert_eq!(warehouse.history_len("TSLA").expect("count"), 2);
    }
}
