//! Price conversion.

/// Converts `amount` units priced at `source_price` into units priced at
/// `target_price`.
///
/// Callers guarantee all three inputs are strictly positive; catalog tokens
/// always carry a positive price and the amount passes validation first.
pub fn convert(amount: f64, source_price: f64, target_price: f64) -> f64 {
    debug_assert!(amount > 0.0 && source_price > 0.0 && target_price > 0.0);
    amount * source_price / target_price
}
