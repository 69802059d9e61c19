use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 32;

/// Punctuation Finnhub uses in index, crypto, forex and share-class tickers.
const SYMBOL_PUNCTUATION: &[char] = &['.', '-', '^', ':', '_', '=', '/'];

/// Canonical form of a raw ticker: surrounding whitespace trimmed, ASCII upper-cased.
pub fn canonicalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

/// Normalized market symbol/ticker, the join key across every table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    ///
    /// Letters, digits and `. - ^ : _ = /` are accepted, which covers class
    /// suffixes (`BRK.B`), indices (`^GSPC`) and venue-prefixed pairs
    /// (`BINANCE:BTCUSDT`, `OANDA:EUR_USD`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = canonicalize(input);
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || SYMBOL_PUNCTUATION.contains(&ch);
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}
