//! HTTP transport seam.
//!
//! [`HttpTransport`] performs a single GET and reports either a response
//! (any status) or a classified connection-level failure. Retry policy lives
//! in [`super::RemoteClient`]; implementations never retry.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A completed HTTP exchange. Non-2xx statuses are responses, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Raw `Retry-After` header value, if present.
    pub retry_after: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Dns,
    Tls,
    Connect,
    Timeout,
    /// Response started but the body could not be read.
    Body,
    Other,
}

/// A GET that produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl StdError for TransportError {}

/// Single-shot HTTP GET.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// Release pooled connections. Further calls must be harmless.
    fn close(&self) {}
}

/// reqwest-backed transport. The underlying client is created on first use.
pub struct ReqwestTransport {
    client: Mutex<Option<reqwest::Client>>,
    closed: AtomicBool,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    fn client(&self) -> Result<reqwest::Client, TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                TransportErrorKind::Other,
                "transport is closed",
            ));
        }
        let mut guard = self.client.lock();
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("multikit/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;
        debug!("Created HTTP client");
        *guard = Some(client.clone());
        Ok(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let client = self.client()?;
        let response = client.get(url).send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(classify)?.to_vec();
        Ok(HttpResponse {
            status,
            retry_after,
            body,
        })
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.client.lock().take();
            debug!("Closed HTTP client");
        }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    let message = error_chain(&err);
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        classify_connect_message(&message)
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, message)
}

/// Connect failures are split by inspecting the rendered source chain.
fn classify_connect_message(message: &str) -> TransportErrorKind {
    let lower = message.to_lowercase();
    if ["dns error", "failed to lookup address", "name or service not known"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        TransportErrorKind::Dns
    } else if ["tls", "ssl", "certificate", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        TransportErrorKind::Tls
    } else {
        TransportErrorKind::Connect
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
