//! Behavior-driven tests for name and fundamentals resolution.
//!
//! These tests verify HOW optional data degrades: every tier is tried in
//! order, and an exhausted chain yields identity names or unknown ratios
//! instead of an error.

use std::sync::Arc;
use std::time::Duration;

use ferroscan_core::{
    ClientConfig, DataClient, FixtureHttpClient, FundamentalsResolver, FundamentalsTier,
    HttpResponse, NameMode, NameResolver, Symbol,
};

fn client(http: &Arc<FixtureHttpClient>) -> DataClient {
    DataClient::new(
        http.clone(),
        ClientConfig::default().with_warm_up_pause(Duration::ZERO),
    )
}

fn symbols(raw: &[&str]) -> Vec<Symbol> {
    raw.iter()
        .map(|code| Symbol::parse(code).expect("valid symbol"))
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Names
// =============================================================================

#[tokio::test]
async fn when_batch_misses_a_symbol_search_fills_it_and_identity_is_last() {
    // Given: a batch lookup that knows AAA, echoes BBB's symbol as its name,
    // and omits CCC; search knows BBB but not CCC
    let http = Arc::new(
        FixtureHttpClient::new()
            .route_json(
                "/v7/finance/quote?symbols=AAA,BBB,CCC",
                r#"{"quoteResponse":{"result":[
                    {"symbol":"AAA","shortName":"Alpha Holdings"},
                    {"symbol":"BBB","shortName":"BBB"}
                ]}}"#,
            )
            .route_json(
                "/v1/finance/search?q=BBB",
                r#"{"quotes":[{"shortname":"  ","longname":"Bravo Industries Ltd"}]}"#,
            ),
    );
    let client = client(&http);
    let universe = symbols(&["AAA", "BBB", "CCC"]);

    // When: names are resolved in auto mode
    let names = NameResolver::new(&client, NameMode::Auto)
        .resolve(&universe)
        .await;

    // Then: each symbol gets the best name its tiers produced
    assert_eq!(names[&universe[0]], "Alpha Holdings");
    assert_eq!(names[&universe[1]], "Bravo Industries Ltd");
    assert_eq!(names[&universe[2]], "CCC");

    // And: AAA was never searched
    assert!(!http
        .requested_urls()
        .iter()
        .any(|url| url.contains("search?q=AAA")));
}

#[tokio::test]
async fn when_names_are_large_batches_they_are_chunked() {
    // Given: a batch size of two and three symbols
    let http = Arc::new(
        FixtureHttpClient::new()
            .route_json(
                "/v7/finance/quote?symbols=AAA,BBB&",
                r#"{"quoteResponse":{"result":[{"symbol":"aaa","longName":"Alpha"}]}}"#,
            )
            .route_json(
                "/v7/finance/quote?symbols=CCC&",
                r#"{"quoteResponse":{"result":[{"symbol":"CCC","displayName":"Charlie"}]}}"#,
            ),
    );
    let config = ClientConfig {
        name_batch_size: 2,
        ..ClientConfig::default().with_warm_up_pause(Duration::ZERO)
    };
    let client = DataClient::new(http.clone(), config);
    let universe = symbols(&["AAA", "BBB", "CCC"]);

    // When: names are resolved
    let names = NameResolver::new(&client, NameMode::Auto)
        .resolve(&universe)
        .await;

    // Then: both chunks contributed, matched case-insensitively
    assert_eq!(names[&universe[0]], "Alpha");
    assert_eq!(names[&universe[1]], "BBB");
    assert_eq!(names[&universe[2]], "Charlie");
}

#[tokio::test]
async fn when_mode_is_search_batch_lookup_is_skipped() {
    // Given: a provider that answers both lookups
    let http = Arc::new(
        FixtureHttpClient::new()
            .route_json(
                "/v7/finance/quote?",
                r#"{"quoteResponse":{"result":[{"symbol":"AAA","shortName":"From Batch"}]}}"#,
            )
            .route_json(
                "/v1/finance/search?q=AAA",
                r#"{"quotes":[{"shortname":"From Search"}]}"#,
            ),
    );
    let client = client(&http);
    let universe = symbols(&["AAA"]);

    // When: names are resolved in search mode
    let names = NameResolver::new(&client, NameMode::Search)
        .resolve(&universe)
        .await;

    // Then: only search was used
    assert_eq!(names[&universe[0]], "From Search");
    assert!(!http
        .requested_urls()
        .iter()
        .any(|url| url.contains("/v7/finance/quote?")));
}

#[tokio::test]
async fn when_mode_is_none_no_request_is_made() {
    // Given: an offline client
    let http = Arc::new(FixtureHttpClient::new());
    let client = client(&http);
    let universe = symbols(&["D05.SI", "^GSPC"]);

    // When: names are resolved without lookups
    let names = NameResolver::new(&client, NameMode::None)
        .resolve(&universe)
        .await;

    // Then: names equal symbols and the transport was untouched
    assert_eq!(names[&universe[0]], "D05.SI");
    assert_eq!(names[&universe[1]], "^GSPC");
    assert!(http.requests().is_empty());
}

// =============================================================================
// Fundamentals
// =============================================================================

#[tokio::test]
async fn when_summary_answers_fundamentals_use_raw_envelopes_and_percent_scaling() {
    // Given: a quoteSummary payload with {raw} envelopes
    let http = Arc::new(FixtureHttpClient::new().route_json(
        "/v10/finance/quoteSummary/AAA?",
        r#"{"quoteSummary":{"result":[{
            "summaryDetail":{
                "trailingPE":{"raw":12.5,"fmt":"12.50"},
                "forwardPE":{"raw":10.0},
                "trailingAnnualDividendYield":{"raw":0.045},
                "fiveYearAvgDividendYield":{"raw":4.2}
            },
            "financialData":{"profitMargins":{"raw":0.25}}
        }]}}"#,
    ));
    let client = client(&http);

    // When: fundamentals are resolved
    let resolved = FundamentalsResolver::new(&client)
        .resolve(&symbols(&["AAA"])[0])
        .await;

    // Then: fractional ratios become percent and the 5Y yield is kept as-is
    assert_eq!(resolved.tier, FundamentalsTier::Summary);
    let fundamentals = resolved.fundamentals;
    assert_close(fundamentals.pe_trailing, 12.5);
    assert_close(fundamentals.pe_forward, 10.0);
    assert_close(fundamentals.div_yield_1y, 4.5);
    assert_close(fundamentals.div_yield_5y, 4.2);
    assert_close(fundamentals.profit_margin, 25.0);
    assert_close(fundamentals.best_pe(), 10.0);
}

#[tokio::test]
async fn when_summary_is_refused_quote_tier_supplies_flat_fields() {
    // Given: quoteSummary rejects the request and v7 quote answers
    let http = Arc::new(
        FixtureHttpClient::new()
            .route(
                "/v10/finance/quoteSummary/",
                HttpResponse::ok(r#"{"finance":{"error":"Unauthorized"}}"#).with_status(401),
            )
            .route_json(
                "/v7/finance/quote?symbols=BBB&",
                r#"{"quoteResponse":{"result":[
                    {"symbol":"BBB","trailingPE":8.0,"dividendYield":0.03,"fiveYearAvgDividendYield":3.1}
                ]}}"#,
            ),
    );
    let client = client(&http);

    // When: fundamentals are resolved
    let resolved = FundamentalsResolver::new(&client)
        .resolve(&symbols(&["BBB"])[0])
        .await;

    // Then: the quote tier answers and margin stays unknown
    assert_eq!(resolved.tier, FundamentalsTier::Quote);
    assert_eq!(resolved.failures.len(), 2);
    assert_close(resolved.fundamentals.pe_trailing, 8.0);
    assert_close(resolved.fundamentals.div_yield_1y, 3.0);
    assert_close(resolved.fundamentals.div_yield_5y, 3.1);
    assert!(resolved.fundamentals.profit_margin.is_nan());
}

#[tokio::test]
async fn when_only_the_html_page_answers_embedded_store_is_scraped() {
    // Given: both JSON tiers are down and the key-statistics page embeds the store
    let page = r#"<html><head></head><body><script>
        root.App.main = {"context":{"dispatcher":{"stores":{"QuoteSummaryStore":{
            "summaryDetail":{"trailingPE":{"raw":15.0},"dividendYield":{"raw":0.02},},
            "defaultKeyStatistics":{"profitMargins":{"raw":0.1},"forwardPE":{"raw":14.0}},
        }}}}};
        (function(root) {}(this));
    </script></body></html>"#;
    let http = Arc::new(
        FixtureHttpClient::new().route_json("/quote/CCC/key-statistics?p=CCC", page),
    );
    let client = client(&http);

    // When: fundamentals are resolved
    let resolved = FundamentalsResolver::new(&client)
        .resolve(&symbols(&["CCC"])[0])
        .await;

    // Then: the embedded tier answers after four JSON failures
    assert_eq!(resolved.tier, FundamentalsTier::EmbeddedPage);
    assert_eq!(resolved.failures.len(), 4);
    assert_close(resolved.fundamentals.pe_trailing, 15.0);
    assert_close(resolved.fundamentals.pe_forward, 14.0);
    assert_close(resolved.fundamentals.div_yield_1y, 2.0);
    assert_close(resolved.fundamentals.profit_margin, 10.0);
}

#[tokio::test]
async fn when_every_tier_fails_fundamentals_are_unknown_not_an_error() {
    // Given: a provider that answers nothing
    let http = Arc::new(FixtureHttpClient::new());
    let client = client(&http);

    // When: fundamentals are resolved
    let resolved = FundamentalsResolver::new(&client)
        .resolve(&symbols(&["DDD"])[0])
        .await;

    // Then: every field is unknown and all six attempts are accounted for
    assert_eq!(resolved.tier, FundamentalsTier::Unknown);
    assert!(resolved.fundamentals.is_unknown());
    assert_eq!(resolved.failures.len(), 6);
    assert!(resolved.fundamentals.best_dividend_yield().is_nan());
}
