use serde::Serialize;
use thiserror::Error;

use quoteline_warehouse::WarehouseError;

use crate::data_source::SourceError;
use crate::Symbol;

/// Validation errors for user-supplied values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
}

/// Why a single symbol could not be ingested.
///
/// Every variant is recovered by the scheduler and reported in the round
/// summary; none of them stops a round.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source kept failing until retries ran out.
    #[error("fetch failed: {0}")]
    TransientFetch(#[from] SourceError),

    /// The provider returned a quote without its `t` timestamp.
    #[error("quote for {symbol} is missing its provider timestamp")]
    MissingQuoteTimestamp { symbol: Symbol },

    /// The reconciliation transaction failed and was rolled back.
    #[error("store write failed: {0}")]
    Write(#[from] WarehouseError),
}

impl IngestError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::TransientFetch(_) => FailureKind::TransientFetchFailure,
            Self::MissingQuoteTimestamp { .. } => FailureKind::MissingQuoteTimestamp,
            Self::Write(_) => FailureKind::WriteFailure,
        }
    }
}

/// Failure classification as it appears in round summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TransientFetchFailure,
    MissingQuoteTimestamp,
    WriteFailure,
}

/// Errors that abort a whole round.
///
/// Unusable symbols never escalate; they are skipped during resolution.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The store could not be opened for the round or its watch-list read.
    #[error("store unavailable: {0}")]
    Store(#[from] WarehouseError),
}
