use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_ENCODING;

use crate::ClientConfig;

/// HTTP GET request envelope used by the data client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            timeout_ms: 20_000,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Raw HTTP response: the body is left encoded exactly as it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Content-Encoding` header, if any.
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_encoding: None,
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(encoding.into());
        self
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timeout: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timeout: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract behind the data client. Implementations own their
/// cookie state; the client never handles cookies itself.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production transport on reqwest with an in-instance cookie jar.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    /// Build a client whose cookie jar persists for the lifetime of this value.
    ///
    /// Bodies are not decompressed by reqwest; the data client decodes them
    /// from the declared `Content-Encoding`.
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::new(Jar::default()))
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| HttpError::new(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url);

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = builder.timeout(Duration::from_millis(request.timeout_ms));

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("request timeout: {e}"))
                } else if e.is_connect() {
                    HttpError::new(format!("connection failed: {e}"))
                } else {
                    HttpError::new(format!("request failed: {e}"))
                }
            })?;

            let status = response.status().as_u16();
            let content_encoding = response
                .headers()
                .get(CONTENT_ENCODING)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let body = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    HttpError::timeout(format!("body read timeout: {e}"))
                } else {
                    HttpError::new(format!("failed to read response body: {e}"))
                }
            })?;

            Ok(HttpResponse {
                status,
                content_encoding,
                body: body.to_vec(),
            })
        })
    }
}

/// Canned outcome served by [`FixtureHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureReply {
    Respond(HttpResponse),
    Fail(HttpError),
}

/// Offline transport for deterministic tests.
///
/// Each route pairs a URL substring with a reply; the first registered route
/// whose pattern occurs in the request URL answers. Unmatched URLs fail with
/// a connection error. Every request is recorded in order.
#[derive(Debug, Default)]
pub struct FixtureHttpClient {
    routes: Vec<(String, FixtureReply)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FixtureHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: impl Into<String>, response: HttpResponse) -> Self {
        self.routes
            .push((pattern.into(), FixtureReply::Respond(response)));
        self
    }

    pub fn route_json(self, pattern: impl Into<String>, body: impl Into<String>) -> Self {
        let body: String = body.into();
        self.route(pattern, HttpResponse::ok(body))
    }

    pub fn route_error(mut self, pattern: impl Into<String>, error: HttpError) -> Self {
        self.routes.push((pattern.into(), FixtureReply::Fail(error)));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.url)
            .collect()
    }

    fn reply_for(&self, url: &str) -> FixtureReply {
        self.routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| {
                FixtureReply::Fail(HttpError::new(format!("connection failed: no route for {url}")))
            })
    }
}

impl HttpClient for FixtureHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let reply = self.reply_for(&request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        Box::pin(async move {
            match reply {
                FixtureReply::Respond(response) => Ok(response),
                FixtureReply::Fail(error) => Err(error),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    use super::*;

    fn block_on<F>(future: F) -> F::Output
    where
        F: Future,
    {
        let waker = noop_waker();
        let mut context = Context::from_waker(&waker);
        let mut future = std::pin::pin!(future);

        loop {
            match future.as_mut().poll(&mut context) {
                Poll::Ready(output) => return output,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn noop_waker() -> Waker {
        // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
        unsafe { Waker::from_raw(noop_raw_waker()) }
    }

    fn noop_raw_waker() -> RawWaker {
        RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
    }

    unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
        noop_raw_waker()
    }

    unsafe fn noop_raw_waker_noop(_: *const ()) {}

    static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
        noop_raw_waker_clone,
        noop_raw_waker_noop,
        noop_raw_waker_noop,
        noop_raw_waker_noop,
    );

    #[test]
    fn headers_are_stored_lowercase() {
        let request = HttpRequest::get("https://example.test/quote").with_header("Accept", "*/*");

        assert_eq!(request.headers.get("accept").map(String::as_str), Some("*/*"));
        assert_eq!(request.header("ACCEPT"), Some("*/*"));
    }

    #[test]
    fn fixture_answers_first_matching_route() {
        let client = FixtureHttpClient::new()
            .route_json("query1", r#"{"host":1}"#)
            .route_json("query", r#"{"host":"any"}"#);

        let response = block_on(client.execute(HttpRequest::get("https://query1.example/x")))
            .expect("route matches");
        assert_eq!(response.body, br#"{"host":1}"#.to_vec());

        let response = block_on(client.execute(HttpRequest::get("https://query2.example/x")))
            .expect("route matches");
        assert_eq!(response.body, br#"{"host":"any"}"#.to_vec());
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn fixture_fails_unmatched_urls() {
        let client = FixtureHttpClient::new().route_json("known", "{}");

        let error = block_on(client.execute(HttpRequest::get("https://other.example/")))
            .expect_err("no route");
        assert!(error.message().contains("no route"));
        assert!(!error.is_timeout());
        assert_eq!(client.requested_urls(), vec!["https://other.example/"]);
    }

    #[test]
    fn fixture_serves_configured_errors() {
        let client = FixtureHttpClient::new()
            .route_error("slow", HttpError::timeout("request timeout: fixture"));

        let error = block_on(client.execute(HttpRequest::get("https://slow.example/")))
            .expect_err("configured failure");
        assert!(error.is_timeout());
    }

    #[test]
    fn reqwest_client_builds_with_its_own_cookie_store() {
        let first = ReqwestHttpClient::new(&ClientConfig::default());
        let second = ReqwestHttpClient::new(&ClientConfig::default());
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
