//! Three-tier fundamentals resolution.
//!
//! 1. quoteSummary modules (`{raw}` envelopes, crumb required upstream)
//! 2. flat v7 quote fields
//! 3. quote summary store embedded in the key-statistics HTML page
//!
//! An exhausted chain degrades to [`Fundamentals::unknown`]; it never drops
//! the instrument.

use serde::Serialize;
use tracing::{debug, warn};

use crate::adapters::yahoo;
use crate::embedded::{extract_embedded_json, select, APP_STATE_MARKER, QUOTE_SUMMARY_STORE_PATH};
use crate::fallback::{AttemptFailure, FallbackResult, FallbackSuccess};
use crate::{DataClient, FetchError, Fundamentals, Symbol};

/// Which tier produced a fundamentals result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalsTier {
    Summary,
    Quote,
    EmbeddedPage,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct ResolvedFundamentals {
    pub fundamentals: Fundamentals,
    pub tier: FundamentalsTier,
    /// Failed attempts across every tier tried.
    pub failures: Vec<AttemptFailure>,
}

pub struct FundamentalsResolver<'a> {
    client: &'a DataClient,
}

impl<'a> FundamentalsResolver<'a> {
    pub fn new(client: &'a DataClient) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, symbol: &Symbol) -> ResolvedFundamentals {
        self.client.ensure_warm(symbol).await;
        let mut failures = Vec::new();

        let summary = self
            .client
            .fetch_with_fallback(
                "quoteSummary",
                &yahoo::summary_urls(symbol),
                yahoo::parse_summary_fundamentals,
            )
            .await;
        if let Some(resolved) = settle(summary, FundamentalsTier::Summary, &mut failures) {
            return resolved;
        }

        let quote = self
            .client
            .fetch_with_fallback(
                "quote",
                &yahoo::quote_urls(std::slice::from_ref(symbol)),
                yahoo::parse_quote_fundamentals,
            )
            .await;
        if let Some(resolved) = settle(quote, FundamentalsTier::Quote, &mut failures) {
            return resolved;
        }

        let page = self
            .client
            .fetch_text_with_fallback(
                "key statistics page",
                &yahoo::fundamentals_page_urls(symbol),
                parse_embedded_page,
            )
            .await;
        if let Some(resolved) = settle(page, FundamentalsTier::EmbeddedPage, &mut failures) {
            return resolved;
        }

        warn!(
            symbol = %symbol,
            attempts = failures.len(),
            "fundamentals unavailable after all attempts"
        );
        ResolvedFundamentals {
            fundamentals: Fundamentals::unknown(),
            tier: FundamentalsTier::Unknown,
            failures,
        }
    }
}

fn settle(
    result: FallbackResult<Fundamentals>,
    tier: FundamentalsTier,
    failures: &mut Vec<AttemptFailure>,
) -> Option<ResolvedFundamentals> {
    match result {
        Ok(FallbackSuccess {
            data,
            failures: tier_failures,
            ..
        }) => {
            debug!(?tier, "fundamentals resolved");
            failures.extend(tier_failures);
            Some(ResolvedFundamentals {
                fundamentals: data,
                tier,
                failures: std::mem::take(failures),
            })
        }
        Err(unavailable) => {
            failures.extend(unavailable.failures);
            None
        }
    }
}

fn parse_embedded_page(html: String) -> Result<Fundamentals, FetchError> {
    let state = extract_embedded_json(&html, APP_STATE_MARKER)
        .ok_or_else(|| FetchError::Parse(String::from("no embedded app state found")))?;
    let store = select(&state, &QUOTE_SUMMARY_STORE_PATH)
        .cloned()
        .ok_or_else(|| FetchError::missing("QuoteSummaryStore"))?;
    yahoo::parse_store_fundamentals(store)
}
