//! Quote source contract and its error type.
//!
//! A [`QuoteSource`] supplies the two records the pipeline stores per symbol:
//!
//! | Method | Response | Description |
//! |--------|----------|-------------|
//! | [`fetch_profile`](QuoteSource::fetch_profile) | [`CompanyProfile`] | Descriptive company data |
//! | [`fetch_quote`](QuoteSource::fetch_quote) | [`QuoteSnapshot`] | Latest prices and provider timestamp |
//! | [`search`](QuoteSource::search) | `Vec<`[`SymbolMatch`]`>` | Symbol lookup for building a watch-list |
//!
//! The fetch calls may fail transiently; the scheduler wraps them in
//! [`retry_with_backoff`](crate::retry::retry_with_backoff).

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{CompanyProfile, QuoteSnapshot, Symbol, SymbolMatch};

/// Boxed future returned by [`QuoteSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured error raised by a quote source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// A validated symbol lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, SourceError> {
        let query = query.into().trim().to_owned();
        if query.is_empty() {
            return Err(SourceError::invalid_request(
                "search query must not be empty",
            ));
        }
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "search limit must be greater than zero",
            ));
        }
        Ok(Self { query, limit })
    }
}

/// Remote market-data provider.
///
/// Implementations must be `Send + Sync`; the scheduler holds them behind an `Arc`.
pub trait QuoteSource: Send + Sync {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the company profile for `symbol`.
    fn fetch_profile<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, CompanyProfile>;

    /// Fetch the latest quote for `symbol`.
    fn fetch_quote<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, QuoteSnapshot>;

    /// Look up symbols matching `request.query`, at most `request.limit` of them.
    fn search<'a>(&'a self, request: &'a SearchRequest) -> SourceFuture<'a, Vec<SymbolMatch>>;
}
