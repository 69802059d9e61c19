//! Decides which symbols a round processes.

use std::collections::BTreeSet;

use quoteline_warehouse::{Warehouse, WarehouseError};

use crate::{Symbol, ValidationError};

/// Result of parsing a symbol override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolList {
    /// Sorted, distinct canonical symbols.
    pub symbols: Vec<Symbol>,
    /// Tokens that did not parse, in input order.
    pub rejected: Vec<(String, ValidationError)>,
}

/// Parses a comma and/or whitespace separated override into sorted, distinct symbols.
///
/// Empty tokens (`"AAPL,,TSLA"`) are skipped. Unusable tokens are collected in
/// [`SymbolList::rejected`] and do not affect the others.
pub fn parse_symbol_list(raw: &str) -> SymbolList {
    let mut symbols = BTreeSet::new();
    let mut rejected = Vec::new();
    for token in raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        match Symbol::parse(token) {
            Ok(symbol) => {
                symbols.insert(symbol);
            }
            Err(error) => rejected.push((token.to_owned(), error)),
        }
    }
    SymbolList {
        symbols: symbols.into_iter().collect(),
        rejected,
    }
}

/// Resolves the symbol list for a round from an override or the persisted watch-list.
#[derive(Clone, Copy)]
pub struct SymbolResolver<'a> {
    warehouse: &'a Warehouse,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(warehouse: &'a Warehouse) -> Self {
        Self { warehouse }
    }

    /// Returns the symbols to ingest, possibly empty.
    ///
    /// An override that yields at least one symbol short-circuits the
    /// watch-list; one that yields none falls back to it. Tokens and
    /// watch-list rows that do not parse are logged and skipped.
    pub fn resolve(&self, symbol_override: Option<&str>) -> Result<Vec<Symbol>, WarehouseError> {
        if let Some(raw) = symbol_override {
            let parsed = parse_symbol_list(raw);
            for (token, error) in &parsed.rejected {
                tracing::warn!(token = %token, %error, "skipping unusable override token");
            }
            if !parsed.symbols.is_empty() {
                tracing::debug!(count = parsed.symbols.len(), "resolved symbols from override");
                return Ok(parsed.symbols);
            }
        }

        let mut symbols = Vec::new();
        for raw in self.warehouse.watchlist_symbols()? {
            match Symbol::parse(&raw) {
                Ok(symbol) if !symbols.contains(&symbol) => symbols.push(symbol),
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(symbol = %raw, %error, "skipping unparseable watch-list entry");
                }
            }
        }
        tracing::debug!(count = symbols.len(), "resolved symbols from watch-list");
        Ok(symbols)
    }
}
