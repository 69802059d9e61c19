//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, canonical ticker |
//! | [`CompanyProfile`] | Name, currency, exchange and industry |
//! | [`QuoteSnapshot`] | Current/high/low/open/previous-close plus provider timestamp |
//! | [`SymbolMatch`] | Symbol lookup hit |

mod models;
mod symbol;

pub use models::{CompanyProfile, QuoteSnapshot, SymbolMatch};
pub use symbol::{canonicalize, Symbol};
