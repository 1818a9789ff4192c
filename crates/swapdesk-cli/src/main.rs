mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

// Logs go to stderr; stdout carries only the rendered envelope.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("swapdesk=debug,swapdesk_core=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("swapdesk=warn,swapdesk_core=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let envelope = commands::run(cli).await?;
    output::render(&envelope, cli.format, cli.pretty)?;

    if envelope.errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let catalog_failure = envelope
        .errors
        .iter()
        .any(|error| error.code.starts_with("catalog."));
    Ok(ExitCode::from(if catalog_failure { 6 } else { 3 }))
}
