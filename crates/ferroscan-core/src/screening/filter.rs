use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{IndicatorRecord, ValidationError};

/// Record field that can stand in for a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerRecord {
    /// The record's own Z-SD.
    ZSd,
    /// The record's own Z-ATR.
    ZAtr,
}

impl PerRecord {
    pub fn value(self, record: &IndicatorRecord) -> f64 {
        match self {
            Self::ZSd => record.z_sd,
            Self::ZAtr => record.z_atr,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ZSd => "Z-SD",
            Self::ZAtr => "Z-ATR",
        }
    }
}

/// A threshold literal: a number, or `z`/`zatr` for per-record mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    Fixed(f64),
    PerRecord(PerRecord),
}

impl Threshold {
    pub const fn fixed(self) -> Option<f64> {
        match self {
            Self::Fixed(value) => Some(value),
            Self::PerRecord(_) => None,
        }
    }
}

impl FromStr for Threshold {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "z" => return Ok(Self::PerRecord(PerRecord::ZSd)),
            "zatr" => return Ok(Self::PerRecord(PerRecord::ZAtr)),
            _ => {}
        }
        parse_fixed(trimmed).map(Self::Fixed)
    }
}

/// Parse a finite numeric threshold.
pub fn parse_fixed(value: &str) -> Result<f64, ValidationError> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ValidationError::InvalidThreshold {
            value: value.to_owned(),
        }),
    }
}

/// Absolute-sign rule: `thr <= 0` keeps `value <= thr`, `thr > 0` keeps `value > thr`.
pub fn passes_sign_rule(value: f64, threshold: f64) -> bool {
    if !value.is_finite() {
        return false;
    }
    if threshold <= 0.0 {
        value <= threshold
    } else {
        value > threshold
    }
}

fn sign_rule_operator(threshold: f64) -> &'static str {
    if threshold <= 0.0 {
        "≤"
    } else {
        ">"
    }
}

/// Sortable / filterable record metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    #[default]
    Delta,
    Z,
    Zatr,
    Rsi,
    RsiSlope,
    Div,
    Pe,
    Margin,
    Sd,
    Atr,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Self::Delta,
        Self::Z,
        Self::Zatr,
        Self::Rsi,
        Self::RsiSlope,
        Self::Div,
        Self::Pe,
        Self::Margin,
        Self::Sd,
        Self::Atr,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Z => "z",
            Self::Zatr => "zatr",
            Self::Rsi => "rsi",
            Self::RsiSlope => "rsi-slope",
            Self::Div => "div",
            Self::Pe => "pe",
            Self::Margin => "margin",
            Self::Sd => "sd",
            Self::Atr => "atr",
        }
    }

    pub fn value(self, record: &IndicatorRecord) -> f64 {
        match self {
            Self::Delta => record.delta_pct,
            Self::Z => record.z_sd,
            Self::Zatr => record.z_atr,
            Self::Rsi => record.rsi,
            Self::RsiSlope => record.rsi_slope,
            Self::Div => record.fundamentals.best_dividend_yield(),
            Self::Pe => record.fundamentals.best_pe(),
            Self::Margin => record.fundamentals.profit_margin,
            Self::Sd => record.volatility,
            Self::Atr => record.atr_primary,
        }
    }

    /// Volatility metrics rank largest first regardless of thresholds.
    pub const fn always_descending(self) -> bool {
        matches!(self, Self::Sd | Self::Atr)
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str() == normalized)
            .ok_or_else(|| ValidationError::InvalidMetric {
                value: value.to_owned(),
            })
    }
}

/// Optional threshold per metric; `None` leaves that predicate inactive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub delta: Option<Threshold>,
    pub div: Option<f64>,
    pub z: Option<f64>,
    pub zatr: Option<f64>,
    pub rsi: Option<f64>,
    pub rsi_slope: Option<f64>,
    pub pe: Option<f64>,
    pub margin: Option<f64>,
}

/// One active predicate, in application order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    DeltaSign(f64),
    DeltaPerRecord(PerRecord),
    DividendAtLeast(f64),
    ZSign(f64),
    ZAtrSign(f64),
    RsiAtMost(f64),
    RsiSlopeSign(f64),
    PeAtMost(f64),
    MarginAtLeast(f64),
}

impl Predicate {
    pub fn keeps(self, record: &IndicatorRecord) -> bool {
        match self {
            Self::DeltaSign(thr) => passes_sign_rule(record.delta_pct, thr),
            Self::DeltaPerRecord(reference) => {
                let bound = reference.value(record);
                record.delta_pct.is_finite() && bound.is_finite() && record.delta_pct <= bound
            }
            Self::DividendAtLeast(thr) => {
                let best = record.fundamentals.best_dividend_yield();
                best.is_finite() && best >= thr
            }
            Self::ZSign(thr) => passes_sign_rule(record.z_sd, thr),
            Self::ZAtrSign(thr) => passes_sign_rule(record.z_atr, thr),
            Self::RsiAtMost(thr) => record.rsi.is_finite() && record.rsi <= thr,
            Self::RsiSlopeSign(thr) => passes_sign_rule(record.rsi_slope, thr),
            Self::PeAtMost(thr) => {
                let best = record.fundamentals.best_pe();
                best.is_finite() && best <= thr
            }
            Self::MarginAtLeast(thr) => {
                let margin = record.fundamentals.profit_margin;
                margin.is_finite() && margin >= thr
            }
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::DeltaSign(thr) => format!("Delta% {} {thr:.2}%", sign_rule_operator(thr)),
            Self::DeltaPerRecord(reference) => {
                format!("Delta% ≤ {} (per-record)", reference.label())
            }
            Self::DividendAtLeast(thr) => format!("Div1Y/5Y ≥ {thr:.2}%"),
            Self::ZSign(thr) => format!("Z-SD {} {thr:.2}", sign_rule_operator(thr)),
            Self::ZAtrSign(thr) => format!("Z-ATR {} {thr:.2}", sign_rule_operator(thr)),
            Self::RsiAtMost(thr) => format!("RSI ≤ {thr:.2}"),
            Self::RsiSlopeSign(thr) => format!("RSI slope {} {thr:.2}", sign_rule_operator(thr)),
            Self::PeAtMost(thr) => format!("P/E ≤ {thr:.2}"),
            Self::MarginAtLeast(thr) => format!("Margin ≥ {thr:.2}%"),
        }
    }
}

impl FilterSpec {
    /// Active predicates in their fixed application order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let delta = self.delta.map(|threshold| match threshold {
            Threshold::Fixed(thr) => Predicate::DeltaSign(thr),
            Threshold::PerRecord(reference) => Predicate::DeltaPerRecord(reference),
        });

        [
            delta,
            self.div.map(Predicate::DividendAtLeast),
            self.z.map(Predicate::ZSign),
            self.zatr.map(Predicate::ZAtrSign),
            self.rsi.map(Predicate::RsiAtMost),
            self.rsi_slope.map(Predicate::RsiSlopeSign),
            self.pe.map(Predicate::PeAtMost),
            self.margin.map(Predicate::MarginAtLeast),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Fixed threshold configured for `metric`, if any.
    pub fn fixed_threshold(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Delta => self.delta.and_then(Threshold::fixed),
            Metric::Z => self.z,
            Metric::Zatr => self.zatr,
            Metric::Rsi => self.rsi,
            Metric::RsiSlope => self.rsi_slope,
            Metric::Div => self.div,
            Metric::Pe => self.pe,
            Metric::Margin => self.margin,
            Metric::Sd | Metric::Atr => None,
        }
    }
}

/// Sort metric and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub metric: Metric,
    pub descending: bool,
}

impl SortKey {
    /// Descending when the metric's fixed threshold is positive, else
    /// ascending; volatility metrics are always descending.
    pub fn for_metric(metric: Metric, filters: &FilterSpec) -> Self {
        let descending = metric.always_descending()
            || filters
                .fixed_threshold(metric)
                .is_some_and(|threshold| threshold > 0.0);
        Self { metric, descending }
    }
}
