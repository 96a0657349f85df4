//! Descriptive statistics over plain `f64` slices.
//!
//! Every function returns NaN instead of panicking or approximating when its
//! input is too short.

/// Arithmetic mean. NaN on empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`). NaN on empty input.
pub fn population_stddev(values: &[f64]) -> f64 {
    let center = mean(values);
    if center.is_nan() {
        return f64::NAN;
    }
    let variance = values
        .iter()
        .map(|value| (value - center).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Mean of the last `window` values. NaN when fewer than `window` exist.
pub fn simple_moving_average(closes: &[f64], window: usize) -> f64 {
    match trailing_window(closes, window) {
        Some(tail) => mean(tail),
        None => f64::NAN,
    }
}

/// Population standard deviation of the last `window` values, NaN when short.
pub fn trailing_stddev(closes: &[f64], window: usize) -> f64 {
    match trailing_window(closes, window) {
        Some(tail) => population_stddev(tail),
        None => f64::NAN,
    }
}

/// Least-squares slope of `y` against `0..n` and the fit's R² in percent.
///
/// Both outputs are NaN with fewer than two points or when `y` is constant.
pub fn least_squares_slope_and_r2(y: &[f64]) -> (f64, f64) {
    let n = y.len();
    if n < 2 || y.iter().any(|value| !value.is_finite()) {
        return (f64::NAN, f64::NAN);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(y);

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (index, value) in y.iter().enumerate() {
        let dx = index as f64 - x_mean;
        let dy = value - y_mean;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return (f64::NAN, f64::NAN);
    }

    let slope = sxy / sxx;
    let correlation = sxy / (sxx * syy).sqrt();
    (slope, correlation * correlation * 100.0)
}

fn trailing_window(values: &[f64], window: usize) -> Option<&[f64]> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(&values[values.len() - window..])
}
