use serde::{Deserialize, Serialize};

use crate::{Currency, UtcDateTime, ValidationError};

/// Default location of the token icon set.
pub const DEFAULT_ICON_BASE_URL: &str =
    "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens";

/// Derivation rule for token icon references.
///
/// The icon is never taken from the price feed; it is always computed from the
/// currency code so a change of rule never leaves stale references behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTemplate {
    base_url: String,
}

impl IconTemplate {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn resolve(&self, currency: &Currency) -> String {
        format!("{}/{}.svg", self.base_url, currency.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for IconTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_ICON_BASE_URL)
    }
}

/// One tradable currency with its reference price.
///
/// `as_of` is informational; it is `None` when the feed's date could not be
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub currency: Currency,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<UtcDateTime>,
    pub icon_ref: String,
}

impl Token {
    pub fn new(
        currency: Currency,
        price: f64,
        as_of: impl Into<Option<UtcDateTime>>,
        icons: &IconTemplate,
    ) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price <= 0.0 {
            return Err(ValidationError::NonPositiveValue { field: "price" });
        }

        let icon_ref = icons.resolve(&currency);
        Ok(Self {
            currency,
            price,
            as_of: as_of.into(),
            icon_ref,
        })
    }

    fn has_usable_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Ordered set of tradable tokens, unique by currency, every price finite and
/// positive.
///
/// Only [`Catalog::from_tokens`] and [`Catalog::empty`] build one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    tokens: Vec<Token>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a catalog, dropping unpriced tokens and collapsing duplicate
    /// currencies.
    ///
    /// A duplicate keeps the slot of the first occurrence and takes the price of
    /// the most recent `as_of`; on equal timestamps the earlier record wins. A
    /// dated record beats an undated one.
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        let mut unique: Vec<Token> = Vec::new();
        for token in tokens.into_iter().filter(Token::has_usable_price) {
            match unique
                .iter_mut()
                .find(|existing| existing.currency == token.currency)
            {
                Some(existing) => {
                    if token.as_of > existing.as_of {
                        *existing = token;
                    }
                }
                None => unique.push(token),
            }
        }
        Self { tokens: unique }
    }

    pub fn find(&self, currency: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.currency.as_str() == currency)
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.find(currency).is_some()
    }

    pub fn price_of(&self, currency: &str) -> Option<f64> {
        self.find(currency).map(|token| token.price)
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(currency: &str, price: f64, as_of: &str) -> Token {
        Token::new(
            Currency::parse(currency).expect("valid currency"),
            price,
            UtcDateTime::parse(as_of).expect("valid timestamp"),
            &IconTemplate::default(),
        )
        .expect("valid token")
    }

    #[test]
    fn icon_ref_is_derived_from_currency() {
        let eth = token("ETH", 1645.93, "2023-08-29T07:10:52.000Z");
        assert_eq!(
            eth.icon_ref,
            "https://raw.githubusercontent.com/Switcheo/token-icons/main/tokens/ETH.svg"
        );

        let custom = IconTemplate::new("https://cdn.example.test/icons/");
        let currency = Currency::parse("wstETH").expect("valid currency");
        assert_eq!(
            custom.resolve(&currency),
            "https://cdn.example.test/icons/wstETH.svg"
        );
    }

    #[test]
    fn rejects_non_positive_and_non_finite_prices() {
        let currency = Currency::parse("ETH").expect("valid currency");
        let ts = UtcDateTime::now();
        let icons = IconTemplate::default();

        assert_eq!(
            Token::new(currency.clone(), 0.0, ts, &icons),
            Err(ValidationError::NonPositiveValue { field: "price" })
        );
        assert_eq!(
            Token::new(currency.clone(), -3.0, ts, &icons),
            Err(ValidationError::NonPositiveValue { field: "price" })
        );
        assert_eq!(
            Token::new(currency, f64::NAN, ts, &icons),
            Err(ValidationError::NonFiniteValue { field: "price" })
        );
    }

    #[test]
    fn duplicates_keep_first_slot_and_latest_price() {
        let catalog = Catalog::from_tokens(vec![
            token("USDC", 0.989832, "2023-08-29T07:10:40.000Z"),
            token("ETH", 1645.93, "2023-08-29T07:10:52.000Z"),
            token("USDC", 1.0, "2023-08-29T07:10:30.000Z"),
            token("ETH", 1650.0, "2023-08-29T07:11:52.000Z"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.tokens()[0].currency.as_str(), "USDC");
        assert_eq!(catalog.price_of("USDC"), Some(0.989832));
        assert_eq!(catalog.tokens()[1].currency.as_str(), "ETH");
        assert_eq!(catalog.price_of("ETH"), Some(1650.0));
    }

    #[test]
    fn tokens_built_without_validation_are_filtered() {
        let unpriced = |currency: &str, price: f64| Token {
            currency: Currency::parse(currency).expect("valid currency"),
            price,
            as_of: None,
            icon_ref: String::new(),
        };
        let catalog = Catalog::from_tokens(vec![
            token("ETH", 3000.0, "2023-08-29T07:10:52.000Z"),
            unpriced("ZERO", 0.0),
            unpriced("ETH", -1.0),
            unpriced("NAN", f64::NAN),
            unpriced("INF", f64::INFINITY),
        ]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.price_of("ETH"), Some(3000.0));
        assert!(!catalog.contains("ZERO"));
    }

    #[test]
    fn dated_duplicate_replaces_undated_one() {
        let undated = Token::new(
            Currency::parse("ETH").expect("valid currency"),
            1.0,
            None::<UtcDateTime>,
            &IconTemplate::default(),
        )
        .expect("valid token");
        let catalog = Catalog::from_tokens(vec![
            undated,
            token("ETH", 1645.93, "2023-08-29T07:10:52.000Z"),
        ]);
        assert_eq!(catalog.price_of("ETH"), Some(1645.93));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = Catalog::from_tokens(vec![token("bNEO", 7.12, "2023-08-29T07:10:50.000Z")]);
        assert!(catalog.contains("bNEO"));
        assert!(!catalog.contains("BNEO"));
    }
}
