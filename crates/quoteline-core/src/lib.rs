//! Ingestion pipeline for quoteline.
//!
//! This crate contains:
//! - Canonical symbol and quote/profile models
//! - The quote source contract (profile, quote, symbol search) and the Finnhub adapter
//! - Bounded retry with exponential backoff
//! - Symbol resolution from an override or the watch-list
//! - Atomic per-symbol reconciliation into the store
//! - The round scheduler and its summaries

pub mod adapters;
pub mod clock;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod reconcile;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod throttling;

pub use adapters::FinnhubAdapter;
pub use clock::{Clock, ManualClock, RecordingSleeper, Sleeper, SystemClock, TokioSleeper};
pub use data_source::{QuoteSource, SearchRequest, SourceError, SourceErrorKind, SourceFuture};
pub use domain::{canonicalize, CompanyProfile, QuoteSnapshot, Symbol, SymbolMatch};
pub use error::{FailureKind, IngestError, SchedulerError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use quoteline_warehouse::{Warehouse, WarehouseConfig, WarehouseError};
pub use reconcile::{Reconciled, ReconciliationWriter};
pub use resolver::{parse_symbol_list, SymbolList, SymbolResolver};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use scheduler::{
    IngestScheduler, IngestSettings, RoundOutcome, RoundSummary, SymbolFailure, SymbolSuccess,
};
pub use throttling::RateBudget;
