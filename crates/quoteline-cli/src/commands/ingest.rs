use std::sync::Arc;

use quoteline_core::{IngestScheduler, RoundOutcome};
use quoteline_warehouse::{Warehouse, WarehouseConfig};

use crate::cli::IngestArgs;
use crate::config;
use crate::error::CliError;

use super::print_json;

pub async fn run(args: &IngestArgs, store: WarehouseConfig) -> Result<(), CliError> {
    let source = config::finnhub_adapter(&args.source)?;
    let settings = config::ingest_settings(args);

    // Fail at startup when the store cannot be opened at all; rounds reopen it.
    drop(Warehouse::open(store.clone())?);

    tracing::info!(
        db_path = %store.location,
        interval_secs = args.interval_secs,
        retries = settings.max_retries,
        "starting ingestion"
    );

    let scheduler = IngestScheduler::new(store, Arc::new(source), settings);
    let mut render_error = None;
    let on_round = |outcome: &RoundOutcome| {
        if render_error.is_some() {
            return;
        }
        if let RoundOutcome::Completed(summary) = outcome {
            render_error = print_json(summary).err();
        }
    };

    match args.rounds {
        Some(limit) => {
            scheduler
                .run(args.symbols.as_deref(), Some(limit), on_round)
                .await?;
        }
        None => {
            scheduler
                .run_forever(args.symbols.as_deref(), on_round)
                .await?;
        }
    }

    render_error.map_or(Ok(()), Err)
}
