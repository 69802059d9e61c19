mod ingest;
mod search;
mod show;
mod watchlist;

use std::io::Write;

use quoteline_core::Symbol;
use quoteline_warehouse::Warehouse;
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::config;
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let store = config::warehouse_config(cli.db_path.as_ref());
    match &cli.command {
        Command::Ingest(args) => ingest::run(args, store).await,
        Command::Watchlist { command } => watchlist::run(command, &Warehouse::open(store)?),
        Command::Show { command } => show::run(command, &Warehouse::open(store)?),
        Command::Search(args) => search::run(args).await,
    }
}

/// Write `value` to stdout as pretty JSON followed by a newline.
fn print_json<T>(value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}

fn parse_symbol(raw: &str) -> Result<Symbol, CliError> {
    Ok(Symbol::parse(raw)?)
}
