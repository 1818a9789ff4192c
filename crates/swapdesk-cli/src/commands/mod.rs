mod balances;
mod exchange;
mod sum;
mod tokens;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use swapdesk_core::{
    CatalogSource, Envelope, EnvelopeError, EnvelopeMeta, FixtureHttpClient, PriceFeedCatalog,
    SwapConfig,
};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let config = resolve_config(cli)?;
    let catalog = catalog_source(cli, &config);

    let command_result = match &cli.command {
        Command::Tokens => tokens::run(catalog).await?,
        Command::Exchange(args) => exchange::run(args, catalog, config.settlement_delay).await?,
        Command::Balances(args) => balances::run(args, catalog).await?,
        Command::Sum(args) => sum::run(args)?,
    };

    let CommandResult {
        data,
        mut warnings,
        errors,
    } = command_result;

    if cli.offline && !matches!(cli.command, Command::Sum(_)) {
        warnings.push(String::from("offline mode: prices come from the bundled sample feed"));
    }

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Environment first, then global flags.
fn resolve_config(cli: &Cli) -> Result<SwapConfig, CliError> {
    let mut config = SwapConfig::from_env()?;

    if let Some(url) = &cli.prices_url {
        config.override_prices_url("--prices-url", url)?;
    }
    if let Some(settlement_ms) = cli.settlement_ms {
        config.settlement_delay = Duration::from_millis(settlement_ms);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        config.http_timeout_ms = timeout_ms;
    }

    debug!(
        prices_url = %config.prices_url,
        settlement_ms = config.settlement_delay.as_millis() as u64,
        timeout_ms = config.http_timeout_ms,
        offline = cli.offline,
        "configuration resolved"
    );
    Ok(config)
}

fn catalog_source(cli: &Cli, config: &SwapConfig) -> Arc<dyn CatalogSource> {
    if cli.offline {
        let fixture = FixtureHttpClient::with_bundled_feed(config.prices_url.clone());
        Arc::new(PriceFeedCatalog::with_http_client(config, Arc::new(fixture)))
    } else {
        Arc::new(PriceFeedCatalog::from_config(config))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn prices_url_flag_is_validated_like_the_environment() {
        let cli = Cli::try_parse_from(["swapdesk", "tokens", "--prices-url", "file:///tmp/p.json"])
            .expect("valid arguments");

        let err = resolve_config(&cli).expect_err("must fail");
        assert!(matches!(
            err,
            CliError::Config(swapdesk_core::ConfigError::InvalidUrl { key: "--prices-url", .. })
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn prices_url_flag_overrides_the_default() {
        let cli = Cli::try_parse_from([
            "swapdesk",
            "tokens",
            "--prices-url",
            "http://localhost:8080/prices.json",
        ])
        .expect("valid arguments");

        let config = resolve_config(&cli).expect("valid configuration");
        assert_eq!(config.prices_url, "http://localhost:8080/prices.json");
    }
}
