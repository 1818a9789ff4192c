//! Amount validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason an amount text is not acceptable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountError {
    #[error("please enter an amount")]
    Missing,
    #[error("amount must be a valid number")]
    NotNumeric,
    #[error("amount must be greater than zero")]
    NotPositive,
}

impl AmountError {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Missing => "amount.missing",
            Self::NotNumeric => "amount.not_numeric",
            Self::NotPositive => "amount.not_positive",
        }
    }

    /// `Missing` is the neutral state of an untouched field.
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Classifies raw amount input, returning the parsed quantity when acceptable.
///
/// Surrounding whitespace is ignored. `NaN` and infinities count as not numeric.
pub fn validate_amount(text: &str) -> Result<f64, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Missing);
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| AmountError::NotNumeric)?;
    if !value.is_finite() {
        return Err(AmountError::NotNumeric);
    }
    if value <= 0.0 {
        return Err(AmountError::NotPositive);
    }

    Ok(value)
}
