use serde::{Deserialize, Serialize};

/// Descriptive company attributes returned by a quote source.
///
/// Every field is optional: providers return an empty object for symbols
/// they have no profile for, and the store overwrites with NULLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
}

/// Price quote returned by a quote source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub current: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    /// Provider quote time in unix seconds; required before anything is stored.
    pub timestamp: Option<i64>,
}

/// One hit from a provider symbol lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Ticker to pass back to the provider, e.g. `AAPL` or `BINANCE:BTCUSDT`.
    pub symbol: String,
    pub display_symbol: String,
    pub description: String,
    /// Security type as labelled by the provider (`Common Stock`, `ETP`, ...).
    pub kind: String,
}

impl QuoteSnapshot {
    pub fn prices(&self) -> quoteline_warehouse::PriceFields {
        quoteline_warehouse::PriceFields {
            current_price: self.current,
            high_price: self.high,
            low_price: self.low,
            open_price: self.open,
            previous_close: self.previous_close,
        }
    }
}
