//! # Ferroscan Core
//!
//! Data acquisition, indicator and screening engine for the ferroscan
//! stock/crypto/index screener.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **A resilient provider client** with session warm-up, crumb handling,
//!   browser-like headers, gzip/deflate decoding and ordered fallback chains
//! - **Series math** for moving averages, ATR, Wilder RSI and trend fits
//! - **Symbol normalization** per market mode, with dedupe and exclusions
//! - **Fundamentals and name resolvers** that degrade instead of failing
//! - **A screening engine** with sign-aware thresholds and NaN-last sorting
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo endpoint URLs and response parsers |
//! | [`client`] | Session-aware data client and fallback chains |
//! | [`config`] | Client and scan configuration |
//! | [`domain`] | Symbols, raw series, records and fundamentals |
//! | [`embedded`] | JSON blobs embedded in HTML pages |
//! | [`encoding`] | Content-Encoding decoding |
//! | [`error`] | Core error types |
//! | [`fallback`] | Fallback chain outcome types |
//! | [`fundamentals`] | Three-tier fundamentals resolver |
//! | [`http_client`] | HTTP client abstraction |
//! | [`indicators`] | Series math and record assembly |
//! | [`names`] | Display-name resolver |
//! | [`screening`] | Filters, sorting and the batch scanner |
//! | [`session`] | Provider session state and crumb handling |
//! | [`universe`] | Symbol normalization and dedupe |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferroscan_core::{
//!     normalize_batch, ClientConfig, DataClient, FilterSpec, MarketMode, Metric, ScanConfig,
//!     Scanner, Threshold,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DataClient::with_reqwest(ClientConfig::from_env())?;
//!     let universe = normalize_batch(["D05", "O39", "U11"], Vec::<&str>::new(), MarketMode::Sg);
//!
//!     let scanner = Scanner::new(&client, ScanConfig::for_mode(MarketMode::Sg))?;
//!     let filters = FilterSpec {
//!         delta: Some(Threshold::Fixed(-5.0)),
//!         ..FilterSpec::default()
//!     };
//!     let report = scanner.scan(&universe, &filters, Metric::Delta).await;
//!
//!     println!("{}", report.result.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Transient provider failures never abort a batch. Single fetches return
//! [`FetchError`], chains return [`FallbackResult`], and only missing price
//! history drops an instrument (see [`ScanError`]).
//!
//! ```rust
//! use ferroscan_core::FetchError;
//!
//! fn is_retryable(error: &FetchError) -> bool {
//!     matches!(
//!         error,
//!         FetchError::Transport(_) | FetchError::Timeout(_) | FetchError::Status { .. }
//!     )
//! }
//! ```

pub mod adapters;
pub mod client;
pub mod config;
pub mod domain;
pub mod embedded;
pub mod encoding;
pub mod error;
pub mod fallback;
pub mod fundamentals;
pub mod http_client;
pub mod indicators;
pub mod names;
pub mod screening;
pub mod session;
pub mod universe;

// Client and configuration
pub use client::DataClient;
pub use config::{ClientConfig, ScanConfig, DEFAULT_USER_AGENT};

// Domain models
pub use domain::{Fundamentals, IndicatorRecord, MarketMode, RawSeries, Symbol};

// Error types
pub use error::{FetchError, ScanError, ValidationError};

// Fallback outcomes
pub use fallback::{
    AttemptFailure, FailureNote, FallbackResult, FallbackSuccess, Unavailable,
};

// Resolvers
pub use fundamentals::{FundamentalsResolver, FundamentalsTier, ResolvedFundamentals};
pub use names::{NameMode, NameResolver};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, FixtureReply, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Indicators
pub use indicators::{compute_record, RecordIdentity};

// Screening
pub use screening::{
    screen, DroppedInstrument, FilterSpec, Metric, PerRecord, Predicate, ScanReport, Scanner,
    ScreenResult, SortKey, Threshold,
};

// Session
pub use session::{Session, SessionState};

// Universe
pub use universe::{dedupe_first_seen, normalize_batch, Duplicate, RejectedInput, Universe};
