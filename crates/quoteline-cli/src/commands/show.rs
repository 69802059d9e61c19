use quoteline_warehouse::Warehouse;

use crate::cli::ShowCommand;
use crate::error::CliError;

use super::{parse_symbol, print_json};

pub fn run(command: &ShowCommand, warehouse: &Warehouse) -> Result<(), CliError> {
    match command {
        ShowCommand::Stocks { limit, offset } => {
            print_json(&warehouse.list_profiles(*limit, *offset)?)
        }
        ShowCommand::Stock { symbol } => {
            let symbol = parse_symbol(symbol)?;
            let profile = warehouse
                .profile(symbol.as_str())?
                .ok_or_else(|| CliError::NotFound(format!("no profile stored for {symbol}")))?;
            print_json(&profile)
        }
        ShowCommand::Quote { symbol } => {
            let symbol = parse_symbol(symbol)?;
            let quote = warehouse
                .latest_quote(symbol.as_str())?
                .ok_or_else(|| CliError::NotFound(format!("no quote stored for {symbol}")))?;
            print_json(&quote)
        }
        ShowCommand::Quotes => print_json(&warehouse.latest_quotes()?),
        ShowCommand::History { symbol, limit } => {
            let symbol = parse_symbol(symbol)?;
            print_json(&warehouse.quote_history(symbol.as_str(), *limit)?)
        }
    }
}
