//! Series math and per-instrument indicator assembly.
//!
//! The submodules are pure functions over slices; [`compute_record`] wires
//! them together into one [`IndicatorRecord`] using the windows from a
//! [`ScanConfig`].

pub mod atr;
pub mod rsi;
pub mod stats;

use std::collections::BTreeMap;

use crate::{Fundamentals, IndicatorRecord, RawSeries, ScanConfig, Symbol};

pub use atr::{average_true_range, true_ranges};
pub use rsi::{wilder_rsi, wilder_rsi_series};
pub use stats::{
    least_squares_slope_and_r2, mean, population_stddev, simple_moving_average, trailing_stddev,
};

/// Identity fields carried into a record alongside the computed indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordIdentity {
    pub code: String,
    pub symbol: Symbol,
    pub name: String,
}

/// Compute every indicator for one instrument.
pub fn compute_record(
    identity: RecordIdentity,
    series: &RawSeries,
    fundamentals: Fundamentals,
    config: &ScanConfig,
) -> IndicatorRecord {
    let closes = series.valid_closes();
    let latest_close = series.latest_close();

    let moving_averages = config
        .ma_windows
        .iter()
        .chain(std::iter::once(&config.reference_window))
        .map(|window| (*window, simple_moving_average(&closes, *window)))
        .collect::<BTreeMap<_, _>>();
    let ma_reference = moving_averages
        .get(&config.reference_window)
        .copied()
        .unwrap_or(f64::NAN);

    let volatility = trailing_stddev(&closes, config.volatility_window);

    let atr = config
        .atr_windows
        .iter()
        .map(|window| {
            (
                *window,
                average_true_range(&series.high, &series.low, &series.close, *window),
            )
        })
        .collect::<BTreeMap<_, _>>();
    let atr_primary = config
        .primary_atr_window()
        .and_then(|window| atr.get(&window).copied())
        .unwrap_or(f64::NAN);

    let rsi_series = wilder_rsi_series(&closes, config.rsi_period);
    let rsi = rsi_series.last().copied().unwrap_or(f64::NAN);
    let (rsi_slope, rsi_r2) = if rsi_series.len() >= config.rsi_slope_window {
        least_squares_slope_and_r2(&rsi_series[rsi_series.len() - config.rsi_slope_window..])
    } else {
        (f64::NAN, f64::NAN)
    };

    let distance = latest_close - ma_reference;

    IndicatorRecord {
        code: identity.code,
        symbol: identity.symbol,
        name: identity.name,
        latest_close,
        sessions: closes.len(),
        moving_averages,
        ma_reference,
        ma_pct_band: ma_reference * (1.0 + config.pct_offset / 100.0),
        ma_sd_band: ma_reference + config.z_offset * volatility,
        delta_pct: finite_ratio(100.0 * distance, ma_reference),
        volatility,
        z_sd: finite_ratio(distance, volatility),
        atr,
        atr_primary,
        z_atr: finite_ratio(distance, atr_primary),
        rsi,
        rsi_slope,
        rsi_r2,
        fundamentals,
    }
}

/// `numerator / denominator`, NaN unless both are finite and the result is too.
fn finite_ratio(numerator: f64, denominator: f64) -> f64 {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
        return f64::NAN;
    }
    numerator / denominator
}
