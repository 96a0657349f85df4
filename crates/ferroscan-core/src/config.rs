//! Runtime configuration for the data client and the scan pipeline.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{MarketMode, ValidationError};

/// Browser identity presented to the provider.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Transport and session settings for [`crate::DataClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Maximum symbols per multi-symbol quote lookup.
    pub name_batch_size: usize,
    /// Pause between the warm-up page visits.
    pub warm_up_pause: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: String::from(DEFAULT_USER_AGENT),
            name_batch_size: 50,
            warm_up_pause: Duration::from_millis(300),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `FERROSCAN_TIMEOUT_MS`, `FERROSCAN_USER_AGENT`
    /// and `FERROSCAN_NAME_BATCH`. Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(timeout_ms) = parse_env::<u64>("FERROSCAN_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Ok(user_agent) = env::var("FERROSCAN_USER_AGENT") {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent;
            }
        }
        if let Some(batch) = parse_env::<usize>("FERROSCAN_NAME_BATCH") {
            config.name_batch_size = batch.max(1);
        }

        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_warm_up_pause(mut self, pause: Duration) -> Self {
        self.warm_up_pause = pause;
        self
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

/// Indicator windows, band offsets and pacing for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub mode: MarketMode,
    /// Chart range code sent to the provider (`1y`, `1mo`, ...).
    pub range: String,
    pub ma_windows: Vec<usize>,
    /// Window of the reference average used for Delta% and Z ratios.
    pub reference_window: usize,
    pub volatility_window: usize,
    /// ATR windows; the first one is the primary ATR used for Z-ATR.
    pub atr_windows: Vec<usize>,
    pub rsi_period: usize,
    pub rsi_slope_window: usize,
    pub pct_offset: f64,
    pub z_offset: f64,
    #[serde(with = "duration_millis")]
    pub delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: MarketMode::Us,
            range: String::from("1y"),
            ma_windows: vec![5, 20, 50, 100, 200],
            reference_window: 20,
            volatility_window: 20,
            atr_windows: vec![14, 20],
            rsi_period: 14,
            rsi_slope_window: 5,
            pct_offset: -4.0,
            z_offset: 0.0,
            delay: Duration::from_millis(300),
        }
    }
}

impl ScanConfig {
    pub fn for_mode(mode: MarketMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn primary_atr_window(&self) -> Option<usize> {
        self.atr_windows.first().copied()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.range.trim().is_empty() {
            return Err(ValidationError::EmptyChartRange);
        }
        if self.atr_windows.is_empty() {
            return Err(ValidationError::NoAtrWindow);
        }

        let windows = [
            ("reference_window", self.reference_window),
            ("volatility_window", self.volatility_window),
            ("rsi_period", self.rsi_period),
            ("rsi_slope_window", self.rsi_slope_window),
        ];
        if let Some((field, _)) = windows.into_iter().find(|(_, window)| *window == 0) {
            return Err(ValidationError::ZeroWindow { field });
        }
        if self.ma_windows.contains(&0) {
            return Err(ValidationError::ZeroWindow {
                field: "ma_windows",
            });
        }
        if self.atr_windows.contains(&0) {
            return Err(ValidationError::ZeroWindow {
                field: "atr_windows",
            });
        }

        Ok(())
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scan_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.primary_atr_window(), Some(14));
    }

    #[test]
    fn zero_window_is_rejected_with_field_name() {
        let config = ScanConfig {
            rsi_period: 0,
            ..ScanConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroWindow {
                field: "rsi_period"
            })
        );
    }

    #[test]
    fn empty_atr_list_is_rejected() {
        let config = ScanConfig {
            atr_windows: Vec::new(),
            ..ScanConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::NoAtrWindow));
    }

    #[test]
    fn delay_serializes_as_milliseconds() {
        let json = serde_json::to_value(ScanConfig::default()).expect("serializes");
        assert_eq!(json["delay"], 300);
        assert_eq!(json["mode"], "us");
    }
}
