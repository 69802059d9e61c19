use serde::Serialize;

/// Descriptive company attributes written to `stocks`.
///
/// Absent fields are stored as NULL; an upsert replaces every column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileRecord {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
}

/// Price fields shared by `quotes_latest` and `quotes_history`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PriceFields {
    pub current_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub open_price: Option<f64>,
    pub previous_close: Option<f64>,
}

/// One symbol's latest quote as written to `quotes_latest`.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestQuoteRecord {
    pub symbol: String,
    pub prices: PriceFields,
    /// Provider timestamp (unix seconds).
    pub quote_ts: i64,
}

/// Outcome of one reconciliation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub collected_ts: i64,
    /// `false` when a history point already existed for `(symbol, collected_ts)`.
    pub history_inserted: bool,
}

/// Profile row as served by the read queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub updated_at: String,
}

/// Latest quote row as served by the read queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredQuote {
    pub symbol: String,
    #[serde(flatten)]
    pub prices: PriceFields,
    pub quote_ts: i64,
    pub updated_at: String,
}

/// One immutable history point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub symbol: String,
    pub collected_ts: i64,
    pub quote_ts: i64,
    #[serde(flatten)]
    pub prices: PriceFields,
}

/// Watch-list membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchEntry {
    pub symbol: String,
    pub position: Option<i64>,
    pub created_at: String,
}

/// Row counts removed by a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub history_rows: usize,
    pub latest_rows: usize,
    pub watch_rows: usize,
    pub profile_rows: usize,
}

impl PurgeReport {
    pub const fn total(&self) -> usize {
        self.history_rows + self.latest_rows + self.watch_rows + self.profile_rows
    }
}
