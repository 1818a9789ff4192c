use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use swapdesk_core::{
    Catalog, CatalogError, CatalogErrorKind, CatalogSource, Currency, FixtureHttpClient,
    HttpError, HttpResponse, IconTemplate, PriceFeedCatalog, RetryConfig, SwapConfig, Token,
    UtcDateTime,
};

const FEED_URL: &str = "https://prices.test/prices.json";

/// In-memory source handing out a fixed catalog.
struct StaticCatalog(Catalog);

impl CatalogSource for StaticCatalog {
    fn load<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Catalog, CatalogError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

struct SourceCase {
    name: &'static str,
    source: Arc<dyn CatalogSource>,
}

fn config() -> SwapConfig {
    SwapConfig {
        prices_url: String::from(FEED_URL),
        retry: RetryConfig::fixed(Duration::ZERO, 2),
        ..SwapConfig::default()
    }
}

fn static_catalog() -> Catalog {
    let as_of = UtcDateTime::parse("2023-08-29T07:10:40.000Z").expect("valid timestamp");
    let icons = IconTemplate::default();
    Catalog::from_tokens([
        Token::new(Currency::parse("ETH").expect("valid"), 3000.0, as_of, &icons)
            .expect("valid token"),
        Token::new(Currency::parse("USDC").expect("valid"), 1.0, as_of, &icons)
            .expect("valid token"),
    ])
}

fn source_cases() -> Vec<SourceCase> {
    vec![
        SourceCase {
            name: "price-feed",
            source: Arc::new(PriceFeedCatalog::with_http_client(
                &config(),
                Arc::new(FixtureHttpClient::with_bundled_feed(FEED_URL)),
            )),
        },
        SourceCase {
            name: "static",
            source: Arc::new(StaticCatalog(static_catalog())),
        },
    ]
}

#[tokio::test]
async fn every_source_yields_unique_positively_priced_tokens() {
    for case in source_cases() {
        let catalog = case
            .source
            .load()
            .await
            .unwrap_or_else(|error| panic!("source '{}' failed: {error}", case.name));

        assert!(!catalog.is_empty(), "source '{}': empty catalog", case.name);

        let mut seen = HashSet::new();
        for token in &catalog {
            assert!(
                token.price.is_finite() && token.price > 0.0,
                "source '{}': {} has price {}",
                case.name,
                token.currency,
                token.price
            );
            assert!(
                seen.insert(token.currency.clone()),
                "source '{}': duplicate {}",
                case.name,
                token.currency
            );
        }
    }
}

#[tokio::test]
async fn every_source_derives_icon_from_currency_code() {
    for case in source_cases() {
        let catalog = case.source.load().await.expect("catalog loads");
        for token in &catalog {
            assert_eq!(
                token.icon_ref,
                format!(
                    "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/{}.svg",
                    token.currency
                ),
                "source '{}'",
                case.name
            );
        }
    }
}

#[tokio::test]
async fn every_source_is_repeatable() {
    for case in source_cases() {
        let first = case.source.load().await.expect("first load");
        let second = case.source.load().await.expect("second load");
        assert_eq!(first, second, "source '{}'", case.name);
    }
}

#[tokio::test]
async fn bundled_feed_drops_unpriced_records_and_collapses_duplicates() {
    let source = PriceFeedCatalog::with_http_client(
        &config(),
        Arc::new(FixtureHttpClient::with_bundled_feed(FEED_URL)),
    );

    let catalog = source.load().await.expect("catalog loads");

    assert_eq!(catalog.len(), 32);
    assert_eq!(
        catalog.first().map(|token| token.currency.as_str()),
        Some("BLUR")
    );
    assert!(!catalog.contains("FWOG"));
    assert!(!catalog.contains("DELISTED"));
    // Latest timestamp wins.
    assert_eq!(catalog.price_of("USDC"), Some(0.989832));
    // Equal timestamps keep the first record.
    assert_eq!(catalog.price_of("BUSD"), Some(0.999183113333333));
    // Case is significant.
    assert!(catalog.contains("bNEO"));
    assert!(!catalog.contains("BNEO"));
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let http = Arc::new(
        FixtureHttpClient::new()
            .with_response(FEED_URL, HttpResponse::status(503, "busy"))
            .with_failure(FEED_URL, HttpError::new("connection reset"))
            .with_response(
                FEED_URL,
                HttpResponse::ok_json(
                    r#"[{"currency":"ETH","date":"2023-08-29T07:10:52.000Z","price":1645.93}]"#,
                ),
            ),
    );
    let source = PriceFeedCatalog::with_http_client(&config(), http.clone());

    let catalog = source.load().await.expect("third attempt succeeds");

    assert_eq!(catalog.len(), 1);
    assert_eq!(http.requests_seen(), 3);
}

#[tokio::test]
async fn retries_stop_at_the_configured_limit() {
    let http = Arc::new(
        FixtureHttpClient::new().with_response(FEED_URL, HttpResponse::status(500, "down")),
    );
    let source = PriceFeedCatalog::with_http_client(&config(), http.clone());

    let err = source.load().await.expect_err("always failing");

    assert_eq!(err.kind(), CatalogErrorKind::Unavailable);
    assert!(err.retryable());
    assert_eq!(http.requests_seen(), 3);
}

#[tokio::test]
async fn client_errors_and_malformed_payloads_are_not_retried() {
    let not_found = Arc::new(FixtureHttpClient::new());
    let source = PriceFeedCatalog::with_http_client(&config(), not_found.clone());
    let err = source.load().await.expect_err("404");
    assert_eq!(err.kind(), CatalogErrorKind::Unavailable);
    assert_eq!(not_found.requests_seen(), 1);

    let garbage = Arc::new(
        FixtureHttpClient::new().with_response(FEED_URL, HttpResponse::ok_json("<html>")),
    );
    let source = PriceFeedCatalog::with_http_client(&config(), garbage.clone());
    let err = source.load().await.expect_err("not json");
    assert_eq!(err.kind(), CatalogErrorKind::Malformed);
    assert_eq!(garbage.requests_seen(), 1);
}

#[tokio::test]
async fn payload_without_priced_records_yields_empty_catalog() {
    let http = Arc::new(FixtureHttpClient::new().with_response(
        FEED_URL,
        HttpResponse::ok_json(r#"[{"currency":"FWOG","date":"2023-08-29T07:10:40.000Z","price":0}]"#),
    ));
    let source = PriceFeedCatalog::with_http_client(&config(), http);

    let catalog = source.load().await.expect("empty is a valid answer");
    assert!(catalog.is_empty());
}
