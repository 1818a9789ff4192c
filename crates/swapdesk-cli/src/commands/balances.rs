use std::sync::Arc;

use serde::Serialize;
use swapdesk_core::{
    load_balances, rank_balances, Catalog, CatalogSource, EnvelopeError, FormattedWalletBalance,
};

use crate::cli::BalancesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct BalancesResponseData {
    total_usd_value: f64,
    rows: Vec<FormattedWalletBalance>,
}

pub async fn run(
    args: &BalancesArgs,
    catalog: Arc<dyn CatalogSource>,
) -> Result<CommandResult, CliError> {
    let balances = load_balances(&args.file)?;

    let (prices, errors) = match catalog.load().await {
        Ok(prices) => (prices, Vec::new()),
        Err(error) => (Catalog::empty(), vec![EnvelopeError::from(&error)]),
    };

    let rows = rank_balances(&balances, &prices);
    let skipped = balances.len() - rows.len();
    let data = serde_json::to_value(BalancesResponseData {
        total_usd_value: rows.iter().map(|row| row.usd_value).sum(),
        rows,
    })?;

    let mut result = CommandResult::ok(data).with_errors(errors);
    if skipped > 0 {
        result = result.with_warning(format!(
            "{skipped} balance(s) skipped: unsupported blockchain or non-positive amount"
        ));
    }
    Ok(result)
}
