//! Round-based ingestion driver.
//!
//! A round opens the store, resolves its symbols, takes one
//! [`RoundSession`](quoteline_warehouse::RoundSession), and for each
//! symbol fetches the profile and quote (each under the retry policy) before
//! handing both to the [`ReconciliationWriter`]. Per-symbol failures are
//! recorded in the [`RoundSummary`] and never stop the round.
//!
//! The store is closed again before the round returns, so nothing holds the
//! database file during the interval sleep. Other processes can edit the
//! watch-list or read quotes between rounds, and the next round sees those
//! edits. An in-memory location is therefore a fresh database every round.

use std::sync::Arc;
use std::time::Duration;

use quoteline_warehouse::{Warehouse, WarehouseConfig};
use serde::Serialize;
use time::OffsetDateTime;

use crate::clock::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::data_source::QuoteSource;
use crate::reconcile::ReconciliationWriter;
use crate::resolver::SymbolResolver;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::{CompanyProfile, FailureKind, IngestError, QuoteSnapshot, SchedulerError, Symbol};

/// Explicit knobs for a scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSettings {
    /// Retries after the first attempt, per fetch.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    /// Pause between two symbols of the same round.
    pub symbol_delay: Duration,
    /// Pause between rounds; zero means single-shot.
    pub interval: Duration,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_secs(1),
            symbol_delay: Duration::from_millis(500),
            interval: Duration::ZERO,
        }
    }
}

impl IngestSettings {
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay)
    }

    pub fn is_interval_mode(&self) -> bool {
        !self.interval.is_zero()
    }
}

/// A symbol that landed in the store this round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolSuccess {
    pub symbol: Symbol,
    pub quote_ts: i64,
}

/// A symbol that was skipped this round, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: Symbol,
    pub kind: FailureKind,
    pub error: String,
}

/// Report emitted at the end of every non-empty round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub db_path: String,
    pub symbols: Vec<Symbol>,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub ok: Vec<SymbolSuccess>,
    pub fail: Vec<SymbolFailure>,
}

impl RoundSummary {
    pub fn is_clean(&self) -> bool {
        self.fail.is_empty()
    }
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No override and an empty watch-list; nothing was fetched.
    Empty,
    Completed(RoundSummary),
}

impl RoundOutcome {
    pub fn summary(&self) -> Option<&RoundSummary> {
        match self {
            Self::Empty => None,
            Self::Completed(summary) => Some(summary),
        }
    }
}

/// Drives ingestion rounds against one store location and one quote source.
pub struct IngestScheduler {
    store: WarehouseConfig,
    source: Arc<dyn QuoteSource>,
    settings: IngestSettings,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    writer: ReconciliationWriter,
}

impl IngestScheduler {
    pub fn new(
        store: WarehouseConfig,
        source: Arc<dyn QuoteSource>,
        settings: IngestSettings,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            store,
            source,
            settings,
            writer: ReconciliationWriter::new(Arc::clone(&clock)),
            clock,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the wall clock used for round timestamps and collection timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.writer = ReconciliationWriter::new(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Replace the sleeper used for backoff, inter-symbol and inter-round pauses.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Run exactly one round.
    ///
    /// The store is opened at the start of the round and closed before it returns.
    ///
    /// # Errors
    /// Only round-level failures escalate: a store that cannot be opened, an
    /// unreadable watch-list, or a store that cannot hand out a session.
    pub async fn run_round(
        &self,
        symbol_override: Option<&str>,
    ) -> Result<RoundOutcome, SchedulerError> {
        let warehouse = Warehouse::open(self.store.clone())?;
        let symbols = SymbolResolver::new(&warehouse).resolve(symbol_override)?;
        if symbols.is_empty() {
            tracing::info!("no symbols to ingest; add some to the watch-list or pass an override");
            return Ok(RoundOutcome::Empty);
        }

        let started_at = self.clock.now();
        let session = warehouse.session()?;
        tracing::info!(
            source = self.source.name(),
            count = symbols.len(),
            "round started"
        );

        let mut ok = Vec::new();
        let mut fail = Vec::new();
        for (index, symbol) in symbols.iter().enumerate() {
            if index > 0 && !self.settings.symbol_delay.is_zero() {
                self.sleeper.sleep(self.settings.symbol_delay).await;
            }

            let outcome = match self.fetch(symbol).await {
                Ok((profile, quote)) => self.writer.reconcile(&session, symbol, &profile, &quote),
                Err(error) => Err(error),
            };
            match outcome {
                Ok(reconciled) => {
                    tracing::info!(
                        symbol = %symbol,
                        quote_ts = reconciled.quote_ts,
                        collected_ts = reconciled.collected_ts,
                        "symbol ingested"
                    );
                    ok.push(SymbolSuccess {
                        symbol: reconciled.symbol,
                        quote_ts: reconciled.quote_ts,
                    });
                }
                Err(error) => {
                    tracing::warn!(symbol = %symbol, kind = ?error.kind(), %error, "symbol failed");
                    fail.push(SymbolFailure {
                        symbol: symbol.clone(),
                        kind: error.kind(),
                        error: error.to_string(),
                    });
                }
            }
        }
        drop(session);
        let db_path = warehouse.location().to_string();
        drop(warehouse);

        let summary = RoundSummary {
            db_path,
            symbols,
            started_at,
            finished_at: self.clock.now(),
            ok,
            fail,
        };
        tracing::info!(
            ok = summary.ok.len(),
            failed = summary.fail.len(),
            "round finished"
        );
        Ok(RoundOutcome::Completed(summary))
    }

    /// Run rounds until `max_rounds` is reached, or forever when it is `None`.
    ///
    /// Single-shot settings always stop after one round. In interval mode every
    /// round, empty or not, counts toward `max_rounds` and is followed by one
    /// interval sleep unless it was the last. Returns the number of rounds run.
    pub async fn run<F>(
        &self,
        symbol_override: Option<&str>,
        max_rounds: Option<usize>,
        mut on_round: F,
    ) -> Result<usize, SchedulerError>
    where
        F: FnMut(&RoundOutcome),
    {
        let mut rounds = 0_usize;
        loop {
            let outcome = self.run_round(symbol_override).await?;
            rounds += 1;
            on_round(&outcome);

            if !self.settings.is_interval_mode() {
                return Ok(rounds);
            }
            if max_rounds.is_some_and(|max| rounds >= max) {
                return Ok(rounds);
            }

            tracing::debug!(
                interval_secs = self.settings.interval.as_secs_f64(),
                "sleeping until next round"
            );
            self.sleeper.sleep(self.settings.interval).await;
        }
    }

    /// Interval loop with no round limit; only returns on a round-level error
    /// or, for single-shot settings, after the first round.
    pub async fn run_forever<F>(
        &self,
        symbol_override: Option<&str>,
        on_round: F,
    ) -> Result<(), SchedulerError>
    where
        F: FnMut(&RoundOutcome),
    {
        self.run(symbol_override, None, on_round).await.map(|_| ())
    }

    async fn fetch(&self, symbol: &Symbol) -> Result<(CompanyProfile, QuoteSnapshot), IngestError> {
        let policy = self.settings.retry_policy();
        let sleeper = self.sleeper.as_ref();

        let profile = retry_with_backoff(policy, sleeper, "fetch_profile", move || {
            self.source.fetch_profile(symbol)
        })
        .await?;
        let quote = retry_with_backoff(policy, sleeper, "fetch_quote", move || {
            self.source.fetch_quote(symbol)
        })
        .await?;

        Ok((profile, quote))
    }
}

impl std::fmt::Debug for IngestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestScheduler")
            .field("store", &self.store.location)
            .field("source", &self.source.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
