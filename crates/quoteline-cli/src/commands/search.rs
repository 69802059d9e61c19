use serde::Serialize;

use quoteline_core::{QuoteSource, SearchRequest, SymbolMatch};

use crate::cli::SearchArgs;
use crate::config;
use crate::error::CliError;

use super::print_json;

#[derive(Debug, Serialize)]
struct SearchResponse<'a> {
    query: &'a str,
    results: Vec<SymbolMatch>,
}

pub async fn run(args: &SearchArgs) -> Result<(), CliError> {
    let request = SearchRequest::new(args.query.as_str(), args.limit)?;
    let source = config::finnhub_adapter(&args.source)?;

    let results = source.search(&request).await?;
    tracing::debug!(query = %request.query, hits = results.len(), "symbol search finished");

    print_json(&SearchResponse {
        query: &request.query,
        results,
    })
}
