//! # Domain Models
//!
//! Canonical domain types for ferroscan.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated provider symbol |
//! | [`MarketMode`] | Asset class selecting how bare codes map to symbols |
//! | [`RawSeries`] | Daily OHLCV columns with missing-bar slots |
//! | [`IndicatorRecord`] | Indicators and fundamentals for one instrument |
//! | [`Fundamentals`] | P/E, dividend yield and profit margin ratios |
//!
//! ## NaN Sentinel
//!
//! Indicator and fundamental fields never use zero or `Option` to mean
//! "unknown". A value whose inputs are missing is `f64::NAN`, which keeps
//! every record shape identical and serializes as JSON `null`.

mod record;
mod series;
mod symbol;

pub use record::{Fundamentals, IndicatorRecord};
pub use series::RawSeries;
pub use symbol::{MarketMode, Symbol};
