//! # Domain Models
//!
//! Canonical domain types for tickerpulse quotes.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated stock symbol |
//! | [`PricePoint`] | One timestamped close, possibly absent |
//! | [`TimeSeries`] | Ascending closes for one symbol |
//! | [`QuoteRecord`] | Serialized price/percent-change record |
//!
//! Provider adapters may hand over observations newest-first or oldest-first;
//! [`TimeSeries::new`] always normalizes to oldest-first so the calculator
//! never has to know which provider produced the data.

mod models;
mod symbol;

pub use models::{PricePoint, QuoteRecord, TimeSeries, ZERO_FIXED};
pub use symbol::Symbol;
