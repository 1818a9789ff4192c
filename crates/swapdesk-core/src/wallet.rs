//! Wallet balance ranking.
//!
//! Balances on supported chains are priced against the catalog and ordered by
//! chain priority, highest first.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Catalog, CoreError, Currency};

/// Priority assigned to chains the wallet does not display.
pub const UNSUPPORTED_PRIORITY: i32 = -99;

/// Holding of one currency on one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    pub currency: Currency,
    pub amount: f64,
    pub blockchain: String,
}

/// Balance ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedWalletBalance {
    #[serde(flatten)]
    pub balance: WalletBalance,
    pub priority: i32,
    /// Amount rounded to a whole number, halves rounding up.
    pub formatted: String,
    pub usd_value: f64,
}

/// Display priority of a blockchain; [`UNSUPPORTED_PRIORITY`] when unknown.
pub fn priority(blockchain: &str) -> i32 {
    match blockchain {
        "Osmosis" => 100,
        "Ethereum" => 50,
        "Arbitrum" => 30,
        "Zilliqa" | "Neo" => 20,
        _ => UNSUPPORTED_PRIORITY,
    }
}

/// Filters, prices, and orders balances for display.
///
/// Unsupported chains and non-positive amounts are dropped. The sort is
/// stable, so equal priorities keep their input order. A currency without a
/// catalog price is valued at zero.
pub fn rank_balances(balances: &[WalletBalance], catalog: &Catalog) -> Vec<FormattedWalletBalance> {
    let mut ranked = balances
        .iter()
        .map(|balance| (balance, priority(&balance.blockchain)))
        .filter(|(balance, priority)| *priority > UNSUPPORTED_PRIORITY && balance.amount > 0.0)
        .map(|(balance, priority)| FormattedWalletBalance {
            balance: balance.clone(),
            priority,
            formatted: format!("{:.0}", balance.amount.round()),
            usd_value: catalog.price_of(balance.currency.as_str()).unwrap_or(0.0) * balance.amount,
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|left, right| right.priority.cmp(&left.priority));
    ranked
}

/// Reads a JSON array of balances from `path`.
pub fn load_balances(path: impl AsRef<Path>) -> Result<Vec<WalletBalance>, CoreError> {
    let raw = std::fs::read_to_string(path)?;
    let balances = serde_json::from_str(&raw)?;
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(currency: &str, amount: f64, blockchain: &str) -> WalletBalance {
        WalletBalance {
            currency: Currency::parse(currency).expect("valid currency"),
            amount,
            blockchain: blockchain.to_owned(),
        }
    }

    #[test]
    fn priority_table() {
        assert_eq!(priority("Osmosis"), 100);
        assert_eq!(priority("Ethereum"), 50);
        assert_eq!(priority("Arbitrum"), 30);
        assert_eq!(priority("Zilliqa"), 20);
        assert_eq!(priority("Neo"), 20);
        assert_eq!(priority("Solana"), UNSUPPORTED_PRIORITY);
        assert_eq!(priority("osmosis"), UNSUPPORTED_PRIORITY);
    }

    #[test]
    fn drops_unsupported_and_empty_balances() {
        let balances = vec![
            balance("ETH", 1.0, "Solana"),
            balance("ETH", 0.0, "Ethereum"),
            balance("ETH", -3.0, "Ethereum"),
            balance("OSMO", 4.0, "Osmosis"),
        ];
        let ranked = rank_balances(&balances, &Catalog::empty());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].balance.currency.as_str(), "OSMO");
        assert_eq!(ranked[0].usd_value, 0.0);
    }

    #[test]
    fn sort_is_stable_for_equal_priorities() {
        let balances = vec![
            balance("ZIL", 1.0, "Zilliqa"),
            balance("NEO", 2.0, "Neo"),
            balance("ETH", 3.0, "Ethereum"),
        ];
        let ranked = rank_balances(&balances, &Catalog::empty());
        let order = ranked
            .iter()
            .map(|item| item.balance.currency.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["ETH", "ZIL", "NEO"]);
    }

    #[test]
    fn formats_without_decimals() {
        let ranked = rank_balances(&[balance("ETH", 12.75, "Ethereum")], &Catalog::empty());
        assert_eq!(ranked[0].formatted, "13");
    }

    #[test]
    fn halves_round_up() {
        let ranked = rank_balances(
            &[
                balance("OSMO", 0.5, "Osmosis"),
                balance("ETH", 2.5, "Ethereum"),
                balance("ARB", 12.4, "Arbitrum"),
            ],
            &Catalog::empty(),
        );
        let formatted = ranked
            .iter()
            .map(|item| item.formatted.as_str())
            .collect::<Vec<_>>();
        assert_eq!(formatted, vec!["1", "3", "12"]);
    }
}
