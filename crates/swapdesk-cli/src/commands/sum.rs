use serde::Serialize;
use swapdesk_core::{sum_to_n_formula, sum_to_n_iter, sum_to_n_loop, sum_to_n_pairs};

use crate::cli::SumArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SumResponseData {
    n: u64,
    iter: u64,
    #[serde(rename = "loop")]
    looped: u64,
    pairs: u64,
    formula: u64,
}

pub fn run(args: &SumArgs) -> Result<CommandResult, CliError> {
    let n = args.n;
    let data = serde_json::to_value(SumResponseData {
        n,
        iter: checked(n, sum_to_n_iter(n))?,
        looped: checked(n, sum_to_n_loop(n))?,
        pairs: checked(n, sum_to_n_pairs(n))?,
        formula: checked(n, sum_to_n_formula(n))?,
    })?;
    Ok(CommandResult::ok(data))
}

fn checked(n: u64, sum: Option<u64>) -> Result<u64, CliError> {
    sum.ok_or_else(|| CliError::Command(format!("sum of 1..={n} does not fit in 64 bits")))
}
