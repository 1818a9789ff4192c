//! CLI argument definitions for swapdesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tokens` | Load the token catalog and print it |
//! | `exchange` | Run one exchange through the workflow |
//! | `balances` | Rank wallet balances priced against the catalog |
//! | `sum` | Triangular sum of `1..=n` |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--offline` | `false` | Serve the bundled sample feed |
//! | `--prices-url` | env / built-in | Price feed URL |
//! | `--settlement-ms` | `3000` | Simulated settlement delay |
//! | `--timeout-ms` | `10000` | HTTP request timeout |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! swapdesk tokens --format table
//! swapdesk exchange --from ETH --to USDC --amount 2 --settlement-ms 0
//! swapdesk balances wallet.json --offline --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Token price catalog and exchange calculator.
#[derive(Debug, Parser)]
#[command(
    name = "swapdesk",
    author,
    version,
    about = "Token price catalog and exchange calculator",
    long_about = "swapdesk loads a token price feed, validates exchange amounts, and converts \
between tokens using their reference prices.\n\
\n\
Use 'swapdesk <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve the bundled sample price feed instead of the network.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Price feed URL (overrides SWAPDESK_PRICES_URL).
    #[arg(long, global = true)]
    pub prices_url: Option<String>,

    /// Settlement delay in milliseconds (overrides SWAPDESK_SETTLEMENT_MS).
    #[arg(long, global = true)]
    pub settlement_ms: Option<u64>,

    /// HTTP request timeout in milliseconds (overrides SWAPDESK_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log debug events to stderr.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable layout for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tradable tokens with their reference prices.
    Tokens,

    /// Convert an amount from one token to another.
    ///
    /// # Examples
    ///
    ///   swapdesk exchange --from ETH --to USDC --amount 2
    ///   swapdesk exchange --from ETH --to USDC --amount 6000 --swap
    Exchange(ExchangeArgs),

    /// Rank wallet balances from a JSON file.
    ///
    /// The file holds an array of {"currency", "amount", "blockchain"} objects.
    Balances(BalancesArgs),

    /// Compute 1 + 2 + ... + n with every implementation.
    Sum(SumArgs),
}

#[derive(Debug, Args)]
pub struct ExchangeArgs {
    /// Currency to send.
    #[arg(long)]
    pub from: String,

    /// Currency to receive.
    #[arg(long)]
    pub to: String,

    /// Amount of the source currency, as typed.
    #[arg(long, allow_hyphen_values = true)]
    pub amount: String,

    /// Swap source and target before converting.
    #[arg(long, default_value_t = false)]
    pub swap: bool,
}

#[derive(Debug, Args)]
pub struct BalancesArgs {
    /// Path to a JSON file with wallet balances.
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct SumArgs {
    #[arg(value_parser = clap::value_parser!(u64).range(0..=10_000_000))]
    pub n: u64,
}
