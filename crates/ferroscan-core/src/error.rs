use thiserror::Error;

/// Validation and contract errors exposed by `ferroscan-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid market mode '{value}', expected one of sg, us, crypto, index")]
    InvalidMarketMode { value: String },
    #[error("invalid name mode '{value}', expected one of auto, search, none")]
    InvalidNameMode { value: String },
    #[error("invalid threshold '{value}', expected a number, 'z' or 'zatr'")]
    InvalidThreshold { value: String },
    #[error("invalid sort metric '{value}'")]
    InvalidMetric { value: String },

    #[error("window '{field}' must be greater than zero")]
    ZeroWindow { field: &'static str },
    #[error("at least one ATR window is required")]
    NoAtrWindow,
    #[error("chart range must not be empty")]
    EmptyChartRange,
}

/// One failed fetch attempt. The fallback chain treats every variant alike.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("http status {status}")]
    Status { status: u16 },
    #[error("failed to decode {encoding} body: {message}")]
    Decode { encoding: String, message: String },
    #[error("malformed body: {0}")]
    Parse(String),
    #[error("missing data: {0}")]
    MissingData(String),
}

impl FetchError {
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingData(what.into())
    }
}

impl From<crate::HttpError> for FetchError {
    fn from(error: crate::HttpError) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.message().to_owned())
        } else {
            Self::Transport(error.message().to_owned())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}

/// Hard per-instrument failure; the instrument is dropped from the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("price history unavailable after {attempts} attempt(s)")]
    HistoryUnavailable { attempts: usize },
    #[error("no close prices in price history")]
    NoValidClose,
}
