use quoteline_warehouse::Warehouse;
use serde::Serialize;

use crate::cli::WatchlistCommand;
use crate::error::CliError;

use super::{parse_symbol, print_json};

/// Top US large caps plus SPY, used when `seed` is given no symbols.
const DEFAULT_SEED: [&str; 50] = [
    "AAPL", "MSFT", "NVDA", "AMZN", "GOOGL", "META", "TSLA", "BRK.B", "JPM", "V", "UNH", "XOM",
    "AVGO", "LLY", "MA", "COST", "HD", "PG", "KO", "PEP", "ABBV", "WMT", "ORCL", "CRM", "BAC",
    "NFLX", "ADBE", "CSCO", "TM", "NKE", "ASML", "INTC", "AMD", "QCOM", "TMO", "MCD", "ABT",
    "MRK", "CVX", "DIS", "GE", "IBM", "INTU", "AMAT", "TXN", "CAT", "PM", "LIN", "NOW", "SPY",
];

#[derive(Debug, Serialize)]
struct MembershipChange<'a> {
    symbol: &'a str,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct SeedResult {
    seeded: usize,
}

pub fn run(command: &WatchlistCommand, warehouse: &Warehouse) -> Result<(), CliError> {
    match command {
        WatchlistCommand::List => print_json(&warehouse.watchlist_entries()?),
        WatchlistCommand::Stocks => print_json(&warehouse.watchlist_profiles()?),
        WatchlistCommand::Add { symbol, position } => {
            let symbol = parse_symbol(symbol)?;
            let changed = warehouse.add_to_watchlist(symbol.as_str(), *position)?;
            print_json(&MembershipChange {
                symbol: symbol.as_str(),
                changed,
            })
        }
        WatchlistCommand::Remove { symbol } => {
            let symbol = parse_symbol(symbol)?;
            let changed = warehouse.remove_from_watchlist(symbol.as_str())?;
            print_json(&MembershipChange {
                symbol: symbol.as_str(),
                changed,
            })
        }
        WatchlistCommand::Purge { symbol } => {
            let symbol = parse_symbol(symbol)?;
            print_json(&warehouse.purge_symbol(symbol.as_str())?)
        }
        WatchlistCommand::Seed { symbols } => {
            let symbols = seed_symbols(symbols)?;
            let seeded = warehouse.replace_watchlist(&symbols)?;
            print_json(&SeedResult { seeded })
        }
    }
}

fn seed_symbols(raw: &[String]) -> Result<Vec<String>, CliError> {
    if raw.is_empty() {
        return Ok(DEFAULT_SEED.iter().map(|s| (*s).to_owned()).collect());
    }
    raw.iter()
        .map(|s| parse_symbol(s).map(String::from))
        .collect()
}
