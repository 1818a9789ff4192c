use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use swapdesk_core::{
    CatalogSource, Currency, EnvelopeError, ExchangeResult, ExchangeWorkflow, TokioClock,
    WorkflowError, WorkflowPhase,
};

use crate::cli::ExchangeArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ExchangeResponseData {
    phase: WorkflowPhase,
    source: Option<Currency>,
    target: Option<Currency>,
    amount_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ExchangeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

pub async fn run(
    args: &ExchangeArgs,
    catalog: Arc<dyn CatalogSource>,
    settlement_delay: Duration,
) -> Result<CommandResult, CliError> {
    let workflow = ExchangeWorkflow::launch(catalog, Arc::new(TokioClock), settlement_delay).await;

    let catalog_error = workflow.snapshot().catalog_error;
    let outcome = match catalog_error {
        Some(error) => Err(WorkflowError::Catalog(error)),
        None => drive(&workflow, args).await,
    };

    let snapshot = workflow.snapshot();
    let (result, errors) = match outcome {
        Ok(result) => (Some(result), Vec::new()),
        Err(error) => (None, vec![EnvelopeError::from(&error)]),
    };

    let data = serde_json::to_value(ExchangeResponseData {
        phase: snapshot.phase,
        source: snapshot.source,
        target: snapshot.target,
        amount_text: snapshot.amount_text,
        summary: result.as_ref().map(ToString::to_string),
        result,
    })?;
    Ok(CommandResult::ok(data).with_errors(errors))
}

async fn drive(
    workflow: &ExchangeWorkflow,
    args: &ExchangeArgs,
) -> Result<ExchangeResult, WorkflowError> {
    workflow.select_source(&args.from)?;
    workflow.select_target(&args.to)?;
    if args.swap {
        workflow.swap()?;
    }
    // An invalid amount is reported by the exchange request itself.
    let _ = workflow.set_amount(args.amount.as_str());
    workflow.request_exchange().await
}
