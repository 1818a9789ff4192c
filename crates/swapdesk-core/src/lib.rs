//! # Swapdesk Core
//!
//! Catalog, validation, and exchange workflow engine for the swapdesk token converter.
//!
//! ## Overview
//!
//! This crate provides everything a front end needs to run a token exchange form
//! without owning any of the logic itself:
//!
//! - **Token catalog** fetched from a remote price feed, filtered and de-duplicated
//! - **Amount validation** classifying raw user input
//! - **Conversion calculator** mapping an amount across two reference prices
//! - **Exchange workflow** state machine with an observable snapshot
//! - **Wallet ranking** pricing balances against the catalog
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`calculator`] | Pure price conversion |
//! | [`catalog`] | Catalog source trait and the HTTP price-feed implementation |
//! | [`clock`] | Settlement clock abstraction |
//! | [`config`] | Runtime configuration with environment overrides |
//! | [`domain`] | Domain models (Currency, Token, Catalog) |
//! | [`envelope`] | Response envelope for machine-readable output |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`retry`] | Backoff and retry policy for the price feed |
//! | [`series`] | Triangular sums |
//! | [`validator`] | Amount validation |
//! | [`wallet`] | Wallet balance ranking and formatting |
//! | [`workflow`] | Exchange orchestrator |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapdesk_core::{ExchangeWorkflow, PriceFeedCatalog, SwapConfig, TokioClock};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SwapConfig::from_env()?;
//!     let catalog = PriceFeedCatalog::from_config(&config);
//!     let workflow = ExchangeWorkflow::new(
//!         Arc::new(catalog),
//!         Arc::new(TokioClock),
//!         config.settlement_delay,
//!     );
//!
//!     workflow.bootstrap().await?;
//!     workflow.select_source("ETH")?;
//!     workflow.select_target("USDC")?;
//!     workflow.set_amount("2")?;
//!
//!     let result = workflow.request_exchange().await?;
//!     println!("{result}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI       │  reads WorkflowSnapshot
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ExchangeWorkflow│────▶│ Settlement Clock │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Catalog Source  │────▶│ HTTP Client      │
//! │ (price feed)    │     │ (reqwest/fixture)│
//! └─────────────────┘     └──────────────────┘
//! ```

pub mod calculator;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod retry;
pub mod series;
pub mod validator;
pub mod wallet;
pub mod workflow;

// Re-export commonly used types at crate root for convenience

pub use calculator::convert;

pub use catalog::{
    parse_price_feed, CatalogError, CatalogErrorKind, CatalogSource, PriceFeedCatalog,
};

pub use clock::{InstantClock, SettlementClock, TokioClock};

pub use config::{ConfigError, SwapConfig, DEFAULT_PRICES_URL};

pub use domain::{Catalog, Currency, IconTemplate, Token, UtcDateTime};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

pub use error::{CoreError, ValidationError};

pub use http_client::{
    bundled_price_feed, FixtureHttpClient, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

pub use retry::{Backoff, RetryConfig};

pub use series::{MAX_SUMMABLE, sum_to_n_formula, sum_to_n_iter, sum_to_n_loop, sum_to_n_pairs};

pub use validator::{validate_amount, AmountError};

pub use wallet::{
    load_balances, priority, rank_balances, FormattedWalletBalance, WalletBalance,
    UNSUPPORTED_PRIORITY,
};

pub use workflow::{
    ExchangeRequest, ExchangeResult, ExchangeWorkflow, WorkflowError, WorkflowPhase,
    WorkflowSnapshot,
};
