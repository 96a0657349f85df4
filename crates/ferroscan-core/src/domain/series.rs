use serde::{Deserialize, Serialize};

/// Daily OHLCV history for one instrument as delivered by the provider.
///
/// The five columns are parallel, one slot per trading session. A `None`
/// slot is a missing bar value; columns may have different lengths when the
/// provider truncates one of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl RawSeries {
    /// Build a series from closes only; high/low/open mirror the close.
    pub fn from_closes(closes: &[f64]) -> Self {
        let column = closes.iter().copied().map(Some).collect::<Vec<_>>();
        Self {
            open: column.clone(),
            high: column.clone(),
            low: column.clone(),
            volume: vec![None; closes.len()],
            close: column,
        }
    }

    /// Number of session slots (longest column).
    pub fn len(&self) -> usize {
        [
            self.open.len(),
            self.high.len(),
            self.low.len(),
            self.close.len(),
            self.volume.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closes that are present and finite, in session order.
    pub fn valid_closes(&self) -> Vec<f64> {
        self.close
            .iter()
            .flatten()
            .copied()
            .filter(|value| value.is_finite())
            .collect()
    }

    /// Most recent present close, or NaN.
    pub fn latest_close(&self) -> f64 {
        self.close
            .iter()
            .rev()
            .flatten()
            .copied()
            .find(|value| value.is_finite())
            .unwrap_or(f64::NAN)
    }
}
