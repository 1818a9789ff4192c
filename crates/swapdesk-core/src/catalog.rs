//! Catalog source contract and the HTTP price-feed implementation.
//!
//! The price feed answers a JSON array of `{currency, date, price}` records.
//! Records without a usable price are dropped, the remaining order is kept as
//! received, and icon references are derived from the currency code.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swapdesk_core::{CatalogSource, FixtureHttpClient, PriceFeedCatalog, SwapConfig};
//!
//! async fn list_tokens() -> Result<(), swapdesk_core::CatalogError> {
//!     let config = SwapConfig::default();
//!     let client = Arc::new(FixtureHttpClient::with_bundled_feed(&config.prices_url));
//!     let source = PriceFeedCatalog::with_http_client(&config, client);
//!
//!     for token in source.load().await?.iter() {
//!         println!("{}: {}", token.currency, token.price);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{Catalog, Currency, IconTemplate, RetryConfig, SwapConfig, Token, UtcDateTime};

/// Catalog failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogErrorKind {
    /// Provider unreachable or answered with a non-success status.
    Unavailable,
    /// Payload could not be parsed into the token shape.
    Malformed,
    /// Payload parsed but held no token with a usable price.
    Empty,
}

/// Structured catalog error surfaced by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogError {
    kind: CatalogErrorKind,
    message: String,
    retryable: bool,
}

impl CatalogError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: CatalogErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: CatalogErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            kind: CatalogErrorKind::Empty,
            message: String::from("price feed returned no token with a usable price"),
            retryable: true,
        }
    }

    pub const fn kind(&self) -> CatalogErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    /// True for fetch failures (as opposed to an empty catalog).
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self.kind,
            CatalogErrorKind::Unavailable | CatalogErrorKind::Malformed
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            CatalogErrorKind::Unavailable => "catalog.unavailable",
            CatalogErrorKind::Malformed => "catalog.malformed",
            CatalogErrorKind::Empty => "catalog.empty",
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for CatalogError {}

/// Catalog source contract.
///
/// Every call is independent and yields a fresh catalog; an empty catalog is a
/// valid answer and is classified by the caller.
pub trait CatalogSource: Send + Sync {
    fn load<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Catalog, CatalogError>> + Send + 'a>>;
}

/// Catalog backed by the public price-feed endpoint.
#[derive(Clone)]
pub struct PriceFeedCatalog {
    http_client: Arc<dyn HttpClient>,
    prices_url: String,
    icons: IconTemplate,
    timeout_ms: u64,
    retry: RetryConfig,
}

impl PriceFeedCatalog {
    /// Builds a catalog that talks to the network through reqwest.
    pub fn from_config(config: &SwapConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: &SwapConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            prices_url: config.prices_url.clone(),
            icons: config.icon_template(),
            timeout_ms: config.http_timeout_ms,
            retry: config.retry.clone(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn prices_url(&self) -> &str {
        &self.prices_url
    }

    async fn fetch_body(&self) -> Result<String, CatalogError> {
        let mut attempt: u32 = 0;
        loop {
            let request = HttpRequest::get(self.prices_url.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.timeout_ms);

            let failure = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    let retry = self.retry.should_retry_status(response.status);
                    let error = CatalogError::unavailable(format!(
                        "price feed returned status {}",
                        response.status
                    ));
                    (error, retry)
                }
                Err(error) => {
                    let retry = error.retryable();
                    let error = CatalogError::unavailable(format!(
                        "price feed transport error: {}",
                        error.message()
                    ));
                    (error, retry)
                }
            };

            let (error, retry) = failure;
            if !retry || !self.retry.allows_retry(attempt) {
                return Err(error);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "price feed request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl CatalogSource for PriceFeedCatalog {
    fn load<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<Catalog, CatalogError>> + Send + 'a>> {
        Box::pin(async move {
            let body = self.fetch_body().await?;
            let catalog = parse_price_feed(&body, &self.icons)?;
            debug!(
                url = %self.prices_url,
                tokens = catalog.len(),
                "price feed loaded"
            );
            Ok(catalog)
        })
    }
}

/// Raw price-feed record.
#[derive(Debug, Clone, Deserialize)]
struct PriceRecord {
    currency: String,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    price: Option<f64>,
}

/// Parses a price-feed payload into a catalog.
///
/// Records whose price is missing, zero, negative, or non-finite are dropped
/// before any other check. A remaining record with a blank currency makes the
/// whole payload malformed. The date is informational: one that is not an
/// RFC3339 UTC timestamp is logged and the token is kept undated.
pub fn parse_price_feed(body: &str, icons: &IconTemplate) -> Result<Catalog, CatalogError> {
    let records: Vec<PriceRecord> = serde_json::from_str(body)
        .map_err(|e| CatalogError::malformed(format!("failed to parse price feed: {e}")))?;

    let received = records.len();
    let tokens = records
        .into_iter()
        .filter_map(|record| match record.price {
            Some(price) if price.is_finite() && price > 0.0 => Some((record, price)),
            _ => None,
        })
        .map(|(record, price)| {
            let currency = Currency::parse(&record.currency).map_err(|e| {
                CatalogError::malformed(format!("invalid currency '{}': {e}", record.currency))
            })?;
            let as_of = record.date.as_deref().and_then(|date| {
                UtcDateTime::parse(date)
                    .map_err(|e| {
                        warn!(
                            currency = %currency,
                            date,
                            error = %e,
                            "ignoring unreadable price date"
                        );
                    })
                    .ok()
            });
            Token::new(currency, price, as_of, icons).map_err(|e| {
                CatalogError::malformed(format!("invalid token '{}': {e}", record.currency))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let usable = tokens.len();
    let catalog = Catalog::from_tokens(tokens);
    debug!(
        received,
        usable,
        unique = catalog.len(),
        "price feed records filtered"
    );
    Ok(catalog)
}
