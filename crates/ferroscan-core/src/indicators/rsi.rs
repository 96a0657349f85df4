//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Seed: simple mean of the first `period` gains/losses, then
//! avg = (avg * (period - 1) + new) / period.
//! Edge case: avg_loss == 0 gives 100 when avg_gain > 0, else 50.

/// RSI after every difference from the seed window onward.
///
/// The first element is the RSI of the seed window; the last element equals
/// [`wilder_rsi`]. Empty when fewer than `period` differences exist.
pub fn wilder_rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }

    let changes = closes
        .iter()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>()
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .collect::<Vec<_>>();

    if changes.len() < period {
        return Vec::new();
    }

    let periods = period as f64;
    let (seed, rest) = changes.split_at(period);
    let mut avg_gain = seed.iter().map(|change| change.max(0.0)).sum::<f64>() / periods;
    let mut avg_loss = seed.iter().map(|change| (-change).max(0.0)).sum::<f64>() / periods;

    let mut series = Vec::with_capacity(rest.len() + 1);
    series.push(compute_rsi(avg_gain, avg_loss));

    for change in rest {
        avg_gain = (avg_gain * (periods - 1.0) + change.max(0.0)) / periods;
        avg_loss = (avg_loss * (periods - 1.0) + (-change).max(0.0)) / periods;
        series.push(compute_rsi(avg_gain, avg_loss));
    }

    series
}

/// Latest Wilder RSI, NaN when fewer than `period` differences exist.
pub fn wilder_rsi(closes: &[f64], period: usize) -> f64 {
    wilder_rsi_series(closes, period)
        .last()
        .copied()
        .unwrap_or(f64::NAN)
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 {
            100.0
        } else {
            50.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
