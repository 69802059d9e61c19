//! Round-scoped write session.

use ::duckdb::{params, Connection};

use crate::models::{LatestQuoteRecord, ProfileRecord, ReconcileReport};
use crate::{finalize_transaction, PooledConnection, WarehouseError};

/// One store connection held for the duration of an ingestion round.
///
/// Each [`RoundSession::reconcile`] call runs in its own transaction on this
/// connection, so a failed symbol rolls back without touching the others.
pub struct RoundSession {
    connection: PooledConnection,
}

impl RoundSession {
    pub(crate) fn new(connection: PooledConnection) -> Self {
        Self { connection }
    }

    /// Upsert the profile and latest quote and append one history point, atomically.
    ///
    /// The history insert is ignored when a point already exists for
    /// `(symbol, collected_ts)`; the report says which case happened.
    ///
    /// # Errors
    /// Returns the first store error; the transaction is rolled back before returning.
    pub fn reconcile(
        &self,
        profile: &ProfileRecord,
        quote: &LatestQuoteRecord,
        collected_ts: i64,
    ) -> Result<ReconcileReport, WarehouseError> {
        if profile.symbol != quote.symbol {
            return Err(WarehouseError::InvalidArgument(format!(
                "profile symbol '{}' does not match quote symbol '{}'",
                profile.symbol, quote.symbol
            )));
        }

        let connection: &Connection = &self.connection;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<ReconcileReport, WarehouseError> {
            upsert_profile(connection, profile)?;
            upsert_latest_quote(connection, quote)?;
            let history_inserted = append_history(connection, quote, collected_ts)?;
            Ok(ReconcileReport {
                collected_ts,
                history_inserted,
            })
        })();

        finalize_transaction(connection, result)
    }
}

fn upsert_profile(connection: &Connection, profile: &ProfileRecord) -> Result<(), WarehouseError> {
    connection.execute(
        "INSERT INTO stocks (symbol, name, currency, exchange, industry, updated_at) \
         VALUES (?, ?, ?, ?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT (symbol) DO UPDATE SET \
           name = excluded.name, \
           currency = excluded.currency, \
           exchange = excluded.exchange, \
           industry = excluded.industry, \
           updated_at = CURRENT_TIMESTAMP",
        params![
            profile.symbol,
            profile.name,
            profile.currency,
            profile.exchange,
            profile.industry
        ],
    )?;
    Ok(())
}

fn upsert_latest_quote(
    connection: &Connection,
    quote: &LatestQuoteRecord,
) -> Result<(), WarehouseError> {
    let prices = &quote.prices;
    connection.execute(
        "INSERT INTO quotes_latest \
         (symbol, current_price, high_price, low_price, open_price, previous_close, quote_ts, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP) \
         ON CONFLICT (symbol) DO UPDATE SET \
           current_price = excluded.current_price, \
           high_price = excluded.high_price, \
           low_price = excluded.low_price, \
           open_price = excluded.open_price, \
           previous_close = excluded.previous_close, \
           quote_ts = excluded.quote_ts, \
           updated_at = CURRENT_TIMESTAMP",
        params![
            quote.symbol,
            prices.current_price,
            prices.high_price,
            prices.low_price,
            prices.open_price,
            prices.previous_close,
            quote.quote_ts
        ],
    )?;
    Ok(())
}

fn append_history(
    connection: &Connection,
    quote: &LatestQuoteRecord,
    collected_ts: i64,
) -> Result<bool, WarehouseError> {
    let existing: i64 = connection.query_row(
        "SELECT COUNT(*) FROM quotes_history WHERE symbol = ? AND collected_ts = ?",
        params![quote.symbol, collected_ts],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(false);
    }

    let prices = &quote.prices;
    connection.execute(
        "INSERT OR IGNORE INTO quotes_history \
         (symbol, collected_ts, quote_ts, current_price, high_price, low_price, open_price, previous_close) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            quote.symbol,
            collected_ts,
            quote.quote_ts,
            prices.current_price,
            prices.high_price,
            prices.low_price,
            prices.open_price,
            prices.previous_close
        ],
    )?;
    Ok(true)
}
