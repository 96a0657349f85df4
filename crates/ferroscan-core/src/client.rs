//! Resilient data client: session warm-up, spoofed fetches and fallback chains.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapters::yahoo;
use crate::encoding::{decode_text, ACCEPT_ENCODING};
use crate::fallback::{host_of, AttemptFailure, FallbackResult, FallbackSuccess, Unavailable};
use crate::session::{accept_crumb, Session, SessionState};
use crate::{
    ClientConfig, FetchError, HttpClient, HttpError, HttpRequest, RawSeries, ReqwestHttpClient,
    Symbol,
};

const ACCEPT_JSON: &str = "application/json,text/plain,*/*";
const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Html,
}

impl BodyKind {
    const fn accept(self) -> &'static str {
        match self {
            Self::Json => ACCEPT_JSON,
            Self::Html => ACCEPT_HTML,
        }
    }
}

/// Provider client owning one session and one transport.
///
/// Transient failures never escape as panics or batch aborts: single fetches
/// return `Result<_, FetchError>` and chains return [`FallbackResult`].
pub struct DataClient {
    http: Arc<dyn HttpClient>,
    session: Session,
    config: ClientConfig,
}

impl DataClient {
    pub fn new(http: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        Self {
            http,
            session: Session::new(),
            config,
        }
    }

    /// Client backed by reqwest with its own cookie jar.
    pub fn with_reqwest(config: ClientConfig) -> Result<Self, HttpError> {
        let http = ReqwestHttpClient::new(&config)?;
        Ok(Self::new(Arc::new(http), config))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Visit the home page, an instrument page and the crumb endpoint.
    ///
    /// Every step is best effort: failures are logged and the session ends up
    /// warm with whatever the successful steps produced.
    pub async fn warm_up(&self, representative: &Symbol) -> SessionState {
        info!(symbol = %representative, "warming up provider session");

        if let Err(error) = self.fetch_text(yahoo::HOME_URL).await {
            warn!(%error, "warm-up: home page visit failed");
        }
        self.pause().await;

        let page = yahoo::quote_page_url(representative);
        if let Err(error) = self.fetch_text(&page).await {
            warn!(symbol = %representative, %error, "warm-up: instrument page visit failed");
        }
        self.pause().await;

        let crumb = match self.fetch_text(yahoo::CRUMB_URL).await {
            Ok(body) => {
                let crumb = accept_crumb(&body);
                if crumb.is_none() {
                    warn!("warm-up: crumb response was not a usable token");
                }
                crumb
            }
            Err(error) => {
                warn!(%error, "warm-up: crumb fetch failed");
                None
            }
        };

        let state = self.session.mark_warm(crumb);
        info!(?state, "provider session ready");
        state
    }

    /// Warm up once; later calls are no-ops until the session is reset.
    pub async fn ensure_warm(&self, representative: &Symbol) -> SessionState {
        match self.session.state() {
            SessionState::Uninitialized => self.warm_up(representative).await,
            warm => warm,
        }
    }

    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let text = self.fetch_body(url, BodyKind::Json).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.fetch_body(url, BodyKind::Html).await
    }

    /// Try each JSON endpoint in order; the first one that fetches and
    /// parses wins.
    pub async fn fetch_with_fallback<T, F>(
        &self,
        what: &str,
        urls: &[String],
        mut parse: F,
    ) -> FallbackResult<T>
    where
        F: FnMut(Value) -> Result<T, FetchError>,
    {
        self.run_chain(what, urls, BodyKind::Json, |text| {
            let value = serde_json::from_str::<Value>(&text)?;
            parse(value)
        })
        .await
    }

    /// Text counterpart of [`Self::fetch_with_fallback`] for HTML pages.
    pub async fn fetch_text_with_fallback<T, F>(
        &self,
        what: &str,
        urls: &[String],
        parse: F,
    ) -> FallbackResult<T>
    where
        F: FnMut(String) -> Result<T, FetchError>,
    {
        self.run_chain(what, urls, BodyKind::Html, parse).await
    }

    /// Daily OHLCV history across the equivalent chart hosts.
    pub async fn fetch_series(&self, symbol: &Symbol, range: &str) -> FallbackResult<RawSeries> {
        let urls = yahoo::chart_urls(symbol, range);
        self.fetch_with_fallback("chart", &urls, yahoo::parse_chart)
            .await
    }

    async fn run_chain<T, F>(
        &self,
        what: &str,
        urls: &[String],
        kind: BodyKind,
        mut parse: F,
    ) -> FallbackResult<T>
    where
        F: FnMut(String) -> Result<T, FetchError>,
    {
        let mut failures: Vec<AttemptFailure> = Vec::new();

        for url in urls {
            let attempt = match self.fetch_body(url, kind).await {
                Ok(text) => parse(text),
                Err(error) => Err(error),
            };

            match attempt {
                Ok(data) => {
                    let host = host_of(url);
                    let mut warnings = Vec::new();
                    if !failures.is_empty() {
                        warnings.push(format!(
                            "{what} fallback succeeded with '{host}' after {} failed attempt(s)",
                            failures.len()
                        ));
                    }
                    return Ok(FallbackSuccess {
                        data,
                        host,
                        failures,
                        warnings,
                    });
                }
                Err(error) => {
                    let failure = AttemptFailure::new(url, error);
                    warn!(
                        what,
                        host = %failure.host,
                        error = %failure.error,
                        "fetch attempt failed, trying next endpoint"
                    );
                    failures.push(failure);
                }
            }
        }

        Err(Unavailable {
            what: what.to_owned(),
            failures,
        })
    }

    async fn fetch_body(&self, url: &str, kind: BodyKind) -> Result<String, FetchError> {
        let url = self.session.substitute_crumb(url);
        debug!(url = %url, "GET");

        let request = HttpRequest::get(url)
            .with_timeout(self.config.timeout)
            .with_header("User-Agent", self.config.user_agent.as_str())
            .with_header("Accept", kind.accept())
            .with_header("Accept-Encoding", ACCEPT_ENCODING)
            .with_header("Accept-Language", "en-US,en;q=0.8")
            .with_header("Referer", yahoo::REFERER)
            .with_header("Origin", yahoo::ORIGIN)
            .with_header("Pragma", "no-cache")
            .with_header("Cache-Control", "no-cache");

        let response = self.http.execute(request).await?;
        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        decode_text(response.content_encoding.as_deref(), &response.body)
    }

    async fn pause(&self) {
        if !self.config.warm_up_pause.is_zero() {
            tokio::time::sleep(self.config.warm_up_pause).await;
        }
    }
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataClient")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
