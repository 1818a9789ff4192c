use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use swapdesk_core::{CatalogSource, EnvelopeError, ExchangeWorkflow, InstantClock, Token};

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct TokensResponseData {
    count: usize,
    rows: Vec<Token>,
}

pub async fn run(catalog: Arc<dyn CatalogSource>) -> Result<CommandResult, CliError> {
    let workflow = ExchangeWorkflow::launch(catalog, Arc::new(InstantClock), Duration::ZERO).await;
    let snapshot = workflow.snapshot();

    let rows = snapshot.catalog.tokens().to_vec();
    let data = serde_json::to_value(TokensResponseData {
        count: rows.len(),
        rows,
    })?;

    let errors = snapshot
        .catalog_error
        .as_ref()
        .map(EnvelopeError::from)
        .into_iter()
        .collect();
    Ok(CommandResult::ok(data).with_errors(errors))
}
