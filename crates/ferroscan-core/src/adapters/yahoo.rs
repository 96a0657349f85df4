//! Yahoo Finance endpoints and response parsing.
//!
//! URL shapes and query parameters are the provider's contract: the chart,
//! quote, search and quoteSummary endpoints only answer 200 when they match
//! exactly. Every builder returns the equivalent hosts in fallback order.

use serde::Deserialize;
use serde_json::Value;

use crate::session::CRUMB_PLACEHOLDER;
use crate::{FetchError, Fundamentals, RawSeries, Symbol};

pub const HOME_URL: &str = "https://finance.yahoo.com/";
pub const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
pub const REFERER: &str = "https://finance.yahoo.com/";
pub const ORIGIN: &str = "https://finance.yahoo.com";

const QUERY_HOSTS: [&str; 2] = ["query1.finance.yahoo.com", "query2.finance.yahoo.com"];
const SUMMARY_MODULES: &str = "summaryDetail,price,defaultKeyStatistics,financialData";

fn encode(symbol: &Symbol) -> String {
    urlencoding::encode(symbol.as_str()).into_owned()
}

/// Instrument page visited during warm-up.
pub fn quote_page_url(symbol: &Symbol) -> String {
    let symbol = encode(symbol);
    format!("https://finance.yahoo.com/quote/{symbol}?p={symbol}")
}

/// HTML pages carrying an embedded quote summary store, in fallback order.
pub fn fundamentals_page_urls(symbol: &Symbol) -> Vec<String> {
    let symbol = encode(symbol);
    vec![
        format!("https://finance.yahoo.com/quote/{symbol}/key-statistics?p={symbol}"),
        format!("https://finance.yahoo.com/quote/{symbol}?p={symbol}"),
    ]
}

/// Daily chart history for `range` (`1y`, `1mo`, ...).
pub fn chart_urls(symbol: &Symbol, range: &str) -> Vec<String> {
    let symbol = encode(symbol);
    let range = urlencoding::encode(range);
    QUERY_HOSTS
        .iter()
        .map(|host| {
            format!(
                "https://{host}/v8/finance/chart/{symbol}?interval=1d&range={range}&includeAdjustedClose=true"
            )
        })
        .collect()
}

/// Multi-symbol v7 quote lookup.
pub fn quote_urls(symbols: &[Symbol]) -> Vec<String> {
    let joined = symbols.iter().map(encode).collect::<Vec<_>>().join(",");
    QUERY_HOSTS
        .iter()
        .map(|host| format!("https://{host}/v7/finance/quote?symbols={joined}&lang=en-US&region=US"))
        .collect()
}

/// Single-symbol search lookup.
pub fn search_urls(symbol: &Symbol) -> Vec<String> {
    let symbol = encode(symbol);
    QUERY_HOSTS
        .iter()
        .rev()
        .map(|host| format!("https://{host}/v1/finance/search?q={symbol}&quotesCount=1"))
        .collect()
}

/// quoteSummary lookup; the crumb placeholder is filled in at request time.
pub fn summary_urls(symbol: &Symbol) -> Vec<String> {
    let symbol = encode(symbol);
    QUERY_HOSTS
        .iter()
        .rev()
        .map(|host| {
            format!(
                "https://{host}/v10/finance/quoteSummary/{symbol}?modules={SUMMARY_MODULES}\
                 &formatted=false&lang=en-US&region=US&ssl=true&corsDomain=finance.yahoo.com\
                 &crumb={CRUMB_PLACEHOLDER}"
            )
        })
        .collect()
}

// ============================================================================
// Chart
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Option<Vec<Option<f64>>>,
    #[serde(default)]
    high: Option<Vec<Option<f64>>>,
    #[serde(default)]
    low: Option<Vec<Option<f64>>>,
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
    #[serde(default)]
    volume: Option<Vec<Option<f64>>>,
}

/// Parse a v8 chart payload into OHLCV columns.
pub fn parse_chart(payload: Value) -> Result<RawSeries, FetchError> {
    let response: YahooChartResponse = serde_json::from_value(payload)?;

    let Some(first) = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        let detail = response
            .chart
            .error
            .filter(|error| !error.is_null())
            .map(|error| error.to_string())
            .unwrap_or_else(|| String::from("empty result"));
        return Err(FetchError::missing(format!("no chart result: {detail}")));
    };

    let quote = first
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .unwrap_or_default();

    Ok(RawSeries {
        open: quote.open.unwrap_or_default(),
        high: quote.high.unwrap_or_default(),
        low: quote.low.unwrap_or_default(),
        close: quote.close.unwrap_or_default(),
        volume: quote.volume.unwrap_or_default(),
    })
}

// ============================================================================
// Quote and search (names)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Option<Vec<YahooQuoteData>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    #[serde(default)]
    symbol: String,
    short_name: Option<String>,
    long_name: Option<String>,
    display_name: Option<String>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    trailing_annual_dividend_yield: Option<RawNumber>,
    dividend_yield: Option<RawNumber>,
    five_year_avg_dividend_yield: Option<RawNumber>,
}

impl YahooQuoteData {
    fn display_name(&self) -> Option<String> {
        [&self.short_name, &self.long_name, &self.display_name]
            .into_iter()
            .flatten()
            .map(|name| name.trim())
            .find(|name| !name.is_empty())
            .map(str::to_owned)
    }
}

fn quote_results(payload: Value) -> Result<Vec<YahooQuoteData>, FetchError> {
    let response: YahooQuoteResponse = serde_json::from_value(payload)?;
    response
        .quote_response
        .result
        .ok_or_else(|| FetchError::missing("quoteResponse.result"))
}

/// `(symbol, name)` pairs from a v7 quote payload; quotes without any name are skipped.
pub fn parse_quote_names(payload: Value) -> Result<Vec<(String, String)>, FetchError> {
    Ok(quote_results(payload)?
        .into_iter()
        .filter_map(|quote| {
            let name = quote.display_name()?;
            Some((quote.symbol.to_ascii_uppercase(), name))
        })
        .collect())
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<YahooSearchQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooSearchQuote {
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    longname: Option<String>,
}

/// Name of the first search hit.
pub fn parse_search_name(payload: Value) -> Result<String, FetchError> {
    let response: YahooSearchResponse = serde_json::from_value(payload)?;
    response
        .quotes
        .into_iter()
        .next()
        .and_then(|quote| {
            [quote.shortname, quote.longname]
                .into_iter()
                .flatten()
                .map(|name| name.trim().to_owned())
                .find(|name| !name.is_empty())
        })
        .ok_or_else(|| FetchError::missing("search quotes[0] name"))
}

// ============================================================================
// Fundamentals
// ============================================================================

/// Numeric field that arrives either plain or wrapped as `{"raw": x, "fmt": ".."}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawNumber(pub Option<f64>);

impl<'de> Deserialize<'de> for RawNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self(raw_number(&value)))
    }
}

impl RawNumber {
    fn value(self) -> f64 {
        self.0.filter(|value| value.is_finite()).unwrap_or(f64::NAN)
    }
}

/// Unwrap a `{raw: x}` envelope or read a plain number; anything else is `None`.
pub fn raw_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}

fn first_known(candidates: &[Option<RawNumber>]) -> Option<RawNumber> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|number| number.0.is_some())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryModules {
    #[serde(default)]
    summary_detail: Option<SummaryDetail>,
    #[serde(default)]
    default_key_statistics: Option<KeyStatistics>,
    #[serde(default)]
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNumber>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    trailing_annual_dividend_yield: Option<RawNumber>,
    dividend_yield: Option<RawNumber>,
    five_year_avg_dividend_yield: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNumber>,
    profit_margins: Option<RawNumber>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    profit_margins: Option<RawNumber>,
}

impl SummaryModules {
    fn is_empty(&self) -> bool {
        self.summary_detail.is_none()
            && self.default_key_statistics.is_none()
            && self.financial_data.is_none()
    }

    /// Yields and margin arrive as fractions and become percent; the 5Y
    /// average yield is already in percent and is kept as-is.
    fn fundamentals(&self) -> Fundamentals {
        let detail = self.summary_detail.clone().unwrap_or_default();
        let stats = self.default_key_statistics.clone().unwrap_or_default();
        let financial = self.financial_data.clone().unwrap_or_default();

        let yield_1y = first_known(&[detail.trailing_annual_dividend_yield, detail.dividend_yield]);
        let margin = first_known(&[financial.profit_margins, stats.profit_margins]);

        Fundamentals {
            pe_trailing: detail.trailing_pe.unwrap_or_default().value(),
            pe_forward: first_known(&[detail.forward_pe, stats.forward_pe])
                .unwrap_or_default()
                .value(),
            div_yield_1y: yield_1y.unwrap_or_default().value() * 100.0,
            div_yield_5y: detail.five_year_avg_dividend_yield.unwrap_or_default().value(),
            profit_margin: margin.unwrap_or_default().value() * 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteSummaryResponse {
    quote_summary: YahooQuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooQuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<SummaryModules>>,
}

/// Tier 1: quoteSummary modules with `{raw}` envelopes.
pub fn parse_summary_fundamentals(payload: Value) -> Result<Fundamentals, FetchError> {
    let response: YahooQuoteSummaryResponse = serde_json::from_value(payload)?;
    let modules = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::missing("quoteSummary.result[0]"))?;
    fundamentals_from_modules(modules)
}

/// Tier 2: flat v7 quote fields.
pub fn parse_quote_fundamentals(payload: Value) -> Result<Fundamentals, FetchError> {
    let quote = quote_results(payload)?
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::missing("quoteResponse.result[0]"))?;

    let yield_1y = first_known(&[quote.trailing_annual_dividend_yield, quote.dividend_yield]);
    Ok(Fundamentals {
        pe_trailing: quote.trailing_pe.unwrap_or_default().value(),
        pe_forward: quote.forward_pe.unwrap_or_default().value(),
        div_yield_1y: yield_1y.unwrap_or_default().value() * 100.0,
        div_yield_5y: quote.five_year_avg_dividend_yield.unwrap_or_default().value(),
        profit_margin: f64::NAN,
    })
}

/// Tier 3: the quote summary store embedded in an HTML page.
pub fn parse_store_fundamentals(store: Value) -> Result<Fundamentals, FetchError> {
    let modules: SummaryModules = serde_json::from_value(store)?;
    fundamentals_from_modules(modules)
}

fn fundamentals_from_modules(modules: SummaryModules) -> Result<Fundamentals, FetchError> {
    if modules.is_empty() {
        return Err(FetchError::missing("summary modules"));
    }
    Ok(modules.fundamentals())
}
