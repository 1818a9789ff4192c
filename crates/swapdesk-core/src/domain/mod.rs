//! # Domain Models
//!
//! Canonical domain types for the swapdesk token catalog.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Currency`] | Validated, case-preserving currency code |
//! | [`Token`] | Currency with a strictly positive reference price |
//! | [`Catalog`] | Ordered tokens, unique by currency |
//! | [`IconTemplate`] | Icon reference derivation rule |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction enforces the invariants: a [`Token`] cannot hold a zero,
//! negative, or non-finite price, and a [`Catalog`] never holds two tokens with
//! the same currency.

mod currency;
mod models;
mod timestamp;

pub use currency::Currency;
pub use models::{Catalog, IconTemplate, Token, DEFAULT_ICON_BASE_URL};
pub use timestamp::UtcDateTime;
