//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), or just
//! high-low for the first usable session.
//! ATR here is the simple mean of the last up-to-`window` True Range values.

use super::stats::mean;

/// True Range per session that has both a high and a low.
///
/// Sessions missing either side are skipped, but their close (when present)
/// still becomes the previous close for the next session.
pub fn true_ranges(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
) -> Vec<f64> {
    let sessions = highs.len().max(lows.len()).max(closes.len());
    let mut ranges = Vec::with_capacity(sessions);
    let mut prev_close: Option<f64> = None;

    for index in 0..sessions {
        let high = highs.get(index).copied().flatten();
        let low = lows.get(index).copied().flatten();
        let close = closes.get(index).copied().flatten();

        if let (Some(high), Some(low)) = (high, low) {
            let range = match prev_close {
                Some(prev) => (high - low).max((high - prev).abs()).max((low - prev).abs()),
                None => high - low,
            };
            if range.is_finite() {
                ranges.push(range);
            }
        }

        if close.is_some() {
            prev_close = close;
        }
    }

    ranges
}

/// Mean of the last up-to-`window` True Range values.
///
/// Fewer than `window` values are averaged as-is; none at all yields NaN.
pub fn average_true_range(
    highs: &[Option<f64>],
    lows: &[Option<f64>],
    closes: &[Option<f64>],
    window: usize,
) -> f64 {
    if window == 0 {
        return f64::NAN;
    }
    let ranges = true_ranges(highs, lows, closes);
    let start = ranges.len().saturating_sub(window);
    mean(&ranges[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn first_session_uses_high_minus_low() {
        let ranges = true_ranges(&some(&[12.0]), &some(&[10.0]), &some(&[11.0]));
        assert_eq!(ranges, vec![2.0]);
    }

    #[test]
    fn gap_against_previous_close_widens_range() {
        // Second bar gaps up: |15 - 11| = 4 beats 15 - 14 = 1.
        let ranges = true_ranges(
            &some(&[12.0, 15.0]),
            &some(&[10.0, 14.0]),
            &some(&[11.0, 14.5]),
        );
        assert_eq!(ranges, vec![2.0, 4.0]);
    }

    #[test]
    fn missing_high_low_carries_close_forward() {
        let highs = vec![Some(12.0), None, Some(21.0)];
        let lows = vec![Some(10.0), None, Some(20.0)];
        let closes = vec![Some(11.0), Some(15.0), Some(20.5)];
        // Third bar compares against close 15 from the skipped session.
        assert_eq!(true_ranges(&highs, &lows, &closes), vec![2.0, 6.0]);
    }

    #[test]
    fn atr_averages_available_ranges_when_short() {
        let atr = average_true_range(
            &some(&[12.0, 15.0]),
            &some(&[10.0, 14.0]),
            &some(&[11.0, 14.5]),
            14,
        );
        assert!((atr - 3.0).abs() < 1e-12);
    }

    #[test]
    fn atr_uses_only_trailing_window() {
        let highs = some(&[20.0, 11.0, 11.0]);
        let lows = some(&[0.0, 10.0, 10.0]);
        let closes = some(&[10.5, 10.5, 10.5]);
        assert!((average_true_range(&highs, &lows, &closes, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn atr_without_high_low_pairs_is_nan() {
        let none = vec![None, None];
        assert!(average_true_range(&none, &none, &some(&[1.0, 2.0]), 14).is_nan());
    }
}
