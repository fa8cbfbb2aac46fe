//! Minimal HTTP client with safe logging, retries, cancellation and flexible auth.
//!
//! - Request options: headers, `Auth`, query params, timeout, retries, cancellation
//! - Redacts sensitive query params and never logs secret values
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//! - Optional *raw* request/response logging via `POSTLENS_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), postlens_http::HttpError> {
//! let client = postlens_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", postlens_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: `Auth::Bearer` values are sanitized before use, and logs only
//! ever include the auth kind (bearer/header/query/none), not the secret.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::env;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

mod diagnostics;

use diagnostics::{extract_error_message, make_curl, redact_headers, redact_pairs, snip_body};

const RAW_ENV: &str = "POSTLENS_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
    #[error("request cancelled")]
    Cancelled,
}

impl HttpError {
    /// HTTP status of an API error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the HTTP client helpers.
///
/// ```
/// use postlens_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// match bearer {
///     Auth::Bearer(value) => assert_eq!(value, "token"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// Custom header (e.g., Azure: Ocp-Apim-Subscription-Key)
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    /// Auth via query param
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::Query { .. } => "query",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use postlens_http::{Auth, RequestOpts};
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     retries: Some(0),
///     auth: Some(Auth::Query {
///         name: "apikey",
///         value: Cow::Borrowed("demo"),
///     }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.cancel.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
    /// Aborts the in-flight attempt or pending backoff with [`HttpError::Cancelled`].
    pub cancel: Option<&'a CancellationToken>,
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// The base always ends in `/` so relative paths extend it instead of
    /// replacing its last segment.
    ///
    /// ```no_run
    /// use postlens_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://example.cognitiveservices.azure.com/language")?;
    /// assert_eq!(client.base_url().as_str(), "https://example.cognitiveservices.azure.com/language/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// assert_eq!(client.max_retries, 2);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET JSON with per-request options.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST JSON with per-request options.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(Method::POST, path, Some(body), opts)
            .await
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    async fn request_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path, opts.allow_absolute)?;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let cancel = opts.cancel;

        let mut query: Vec<(&str, Cow<'_, str>)> = opts.query.clone().unwrap_or_default();
        if let Some(Auth::Query { name, value }) = &opts.auth {
            query.push((*name, value.clone()));
        }
        let redacted_q = redact_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));

        let body_bytes = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(format!("body serialization failed: {e}")))?;

        let bearer = match &opts.auth {
            Some(Auth::Bearer(tok)) => Some(sanitize_api_key(tok)?),
            _ => None,
        };
        let auth_kind = opts.auth.as_ref().map(Auth::kind).unwrap_or("none");

        let mut attempt = 0usize;
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(HttpError::Cancelled);
            }

            // ----- Build request -----
            let mut rb = self
                .inner
                .request(method.clone(), url.clone())
                .timeout(timeout);
            if !query.is_empty() {
                let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }
            if let Some(bytes) = &body_bytes {
                rb = rb
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            if let Some(hdrs) = &opts.headers {
                rb = rb.headers(hdrs.clone());
            }
            match &opts.auth {
                Some(Auth::Header { name, value }) => rb = rb.header(name, value),
                Some(Auth::Bearer(_)) => {
                    if let Some(tok) = &bearer {
                        rb = rb.bearer_auth(tok);
                    }
                }
                _ => {}
            }

            let req_id = uuid::Uuid::new_v4().simple().to_string();
            tracing::debug!(
                req_id=%req_id,
                attempt=attempt + 1,
                max_retries,
                method=%method,
                host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                query=?redacted_q,
                timeout_ms=timeout.as_millis() as u64,
                auth_kind,
                has_body=%body_bytes.is_some(),
                "http.request.start"
            );
            if raw_enabled() {
                let curl = make_curl(
                    &method,
                    &url,
                    &redacted_q,
                    opts.headers.as_ref(),
                    body_bytes.as_deref(),
                    RAW_MAX_BODY,
                );
                tracing::debug!(target: "http.raw", %req_id, %curl, "request");
            }

            // ----- Send -----
            let t0 = std::time::Instant::now();
            let sent = cancellable(cancel, async {
                let resp = rb.send().await?;
                let status = resp.status();
                let headers = resp.headers().clone();
                let bytes = resp.bytes().await?;
                Ok::<_, reqwest::Error>((status, headers, bytes))
            })
            .await?;

            let (status, headers, bytes) = match sent {
                Ok(parts) => parts,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = exponential_backoff(attempt);
                        tracing::warn!(
                            req_id=%req_id,
                            attempt,
                            max_retries,
                            backoff_ms=delay.as_millis() as u64,
                            message=%message,
                            "http.retrying.network"
                        );
                        cancellable(cancel, tokio::time::sleep(delay)).await?;
                        continue;
                    }
                    tracing::warn!(
                        req_id=%req_id,
                        attempt,
                        max_retries,
                        message=%message,
                        "http.network_error"
                    );
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let server_req_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("apim-request-id"))
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            let remaining = headers
                .get("x-rate-limit-remaining")
                .and_then(|v| v.to_str().ok());

            tracing::debug!(
                req_id=%req_id,
                %status,
                duration_ms=dur_ms,
                body_len=bytes.len(),
                x_request_id=%server_req_id,
                rate_limit.remaining=?remaining,
                "http.response.headers"
            );
            if raw_enabled() {
                let shown = &bytes[..bytes.len().min(RAW_MAX_BODY)];
                tracing::info!(
                    target: "http.raw",
                    %req_id,
                    status=%status,
                    duration_ms=dur_ms,
                    headers=?redact_headers(&headers),
                    body=%String::from_utf8_lossy(shown),
                    truncated=bytes.len() > RAW_MAX_BODY
                );
            }

            let snippet = snip_body(&bytes);
            tracing::trace!(req_id=%req_id, body_snippet=%snippet, "http.response.body_snippet");

            // ----- Success path -----
            if status.is_success() {
                return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                    tracing::warn!(
                        req_id=%req_id,
                        serde_line=%e.line(),
                        serde_col=%e.column(),
                        serde_err=%e,
                        body_snippet=%snippet,
                        "http.response.decode_error"
                    );
                    HttpError::Decode(e.to_string(), snippet)
                });
            }

            // ----- Non-success: maybe retry -----
            let message = extract_error_message(&bytes);
            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;

            if (is_429 || status.is_server_error()) && attempt < max_retries {
                attempt += 1;
                let delay = match retry_after_delay_secs(&headers) {
                    Some(secs) => Duration::from_secs(secs),
                    None if is_429 => exponential_backoff(attempt).max(Duration::from_millis(1100)),
                    None => exponential_backoff(attempt),
                };
                tracing::warn!(
                    req_id=%req_id,
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms=delay.as_millis() as u64,
                    message=%message,
                    "http.retrying"
                );
                cancellable(cancel, tokio::time::sleep(delay)).await?;
                continue;
            }

            tracing::warn!(
                req_id=%req_id,
                %status,
                message=%message,
                x_request_id=%server_req_id,
                body_snippet=%snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id: server_req_id,
            });
        }
    }
}

async fn cancellable<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Result<F::Output, HttpError> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(HttpError::Cancelled),
            out = fut => Ok(out),
        },
        None => Ok(fut.await),
    }
}

fn exponential_backoff(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(16) as u32;
    Duration::from_millis(200u64.saturating_mul(1u64 << shift))
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .trim()
        .parse()
        .ok()
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {s}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}
