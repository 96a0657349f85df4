use std::collections::BTreeMap;

use serde::Serialize;

use crate::Symbol;

/// Fundamental ratios for one instrument. Every field is NaN when unknown.
///
/// Yields and margin are expressed in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fundamentals {
    pub pe_trailing: f64,
    pub pe_forward: f64,
    pub div_yield_1y: f64,
    pub div_yield_5y: f64,
    pub profit_margin: f64,
}

impl Default for Fundamentals {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Fundamentals {
    pub const fn unknown() -> Self {
        Self {
            pe_trailing: f64::NAN,
            pe_forward: f64::NAN,
            div_yield_1y: f64::NAN,
            div_yield_5y: f64::NAN,
            profit_margin: f64::NAN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        [
            self.pe_trailing,
            self.pe_forward,
            self.div_yield_1y,
            self.div_yield_5y,
            self.profit_margin,
        ]
        .iter()
        .all(|value| value.is_nan())
    }

    /// Larger of the finite 1Y/5Y yields, NaN when neither is finite.
    pub fn best_dividend_yield(&self) -> f64 {
        [self.div_yield_1y, self.div_yield_5y]
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(f64::NAN, f64::max)
    }

    /// Smaller of the finite, positive trailing/forward P/E, NaN when neither qualifies.
    pub fn best_pe(&self) -> f64 {
        [self.pe_trailing, self.pe_forward]
            .into_iter()
            .filter(|value| value.is_finite() && *value > 0.0)
            .fold(f64::NAN, f64::min)
    }
}

/// Indicators and fundamentals computed for one instrument.
///
/// Numeric fields are either finite or NaN; NaN marks a value whose inputs
/// were insufficient or invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    /// Code shown to the user (canonical symbol without the market affix).
    pub code: String,
    pub symbol: Symbol,
    pub name: String,
    pub latest_close: f64,
    /// Count of valid closes the indicators were computed from.
    pub sessions: usize,
    /// Simple moving averages keyed by window length.
    pub moving_averages: BTreeMap<usize, f64>,
    /// Reference average the trend ratios are measured against (MA20).
    pub ma_reference: f64,
    /// `MA20 * (1 + pct_offset / 100)`.
    pub ma_pct_band: f64,
    /// `MA20 + z_offset * SD20`.
    pub ma_sd_band: f64,
    pub delta_pct: f64,
    /// Population standard deviation of the last volatility-window closes.
    pub volatility: f64,
    pub z_sd: f64,
    /// Average True Range keyed by window length.
    pub atr: BTreeMap<usize, f64>,
    pub atr_primary: f64,
    pub z_atr: f64,
    pub rsi: f64,
    pub rsi_slope: f64,
    /// R-squared of the RSI slope fit, in percent.
    pub rsi_r2: f64,
    pub fundamentals: Fundamentals,
}

impl IndicatorRecord {
    pub fn moving_average(&self, window: usize) -> f64 {
        self.moving_averages
            .get(&window)
            .copied()
            .unwrap_or(f64::NAN)
    }

    pub fn average_true_range(&self, window: usize) -> f64 {
        self.atr.get(&window).copied().unwrap_or(f64::NAN)
    }
}
