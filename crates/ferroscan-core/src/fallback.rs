//! Outcome types for ordered fallback chains over equivalent endpoints.

use serde::Serialize;
use thiserror::Error;

use crate::FetchError;

/// One failed attempt in a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub host: String,
    pub url: String,
    pub error: FetchError,
}

impl AttemptFailure {
    pub fn new(url: &str, error: FetchError) -> Self {
        Self {
            host: host_of(url),
            url: url.to_owned(),
            error,
        }
    }
}

/// Successful chain: the first parsed result plus every attempt that failed before it.
#[derive(Debug, Clone)]
pub struct FallbackSuccess<T> {
    pub data: T,
    pub host: String,
    pub failures: Vec<AttemptFailure>,
    pub warnings: Vec<String>,
}

/// Every endpoint in the chain failed.
#[derive(Debug, Clone, Error)]
#[error("{what} unavailable after {} failed attempt(s)", .failures.len())]
pub struct Unavailable {
    pub what: String,
    pub failures: Vec<AttemptFailure>,
}

pub type FallbackResult<T> = Result<FallbackSuccess<T>, Unavailable>;

/// Failure summary suitable for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureNote {
    pub host: String,
    pub error: String,
}

impl From<&AttemptFailure> for FailureNote {
    fn from(failure: &AttemptFailure) -> Self {
        Self {
            host: failure.host.clone(),
            error: failure.error.to_string(),
        }
    }
}

/// Host part of a URL, or the URL itself when it does not parse.
pub fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_extracted_from_url() {
        assert_eq!(
            host_of("https://query2.finance.yahoo.com/v7/finance/quote?symbols=A"),
            "query2.finance.yahoo.com"
        );
        assert_eq!(host_of("not a url"), "not a url");
    }

    #[test]
    fn unavailable_message_counts_attempts() {
        let error = Unavailable {
            what: String::from("chart"),
            failures: vec![AttemptFailure::new(
                "https://query1.finance.yahoo.com/x",
                FetchError::Status { status: 404 },
            )],
        };
        assert_eq!(error.to_string(), "chart unavailable after 1 failed attempt(s)");
    }
}
