//! Per-origin host-health tracking.
//!
//! Connection-level failures (DNS, TLS, connect, timeout) are remembered per
//! origin. Three consecutive failures of the same class mark the host
//! unreachable so the caller stops spending its retry budget on it. Any other
//! outcome clears the origin's history.

use super::transport::TransportErrorKind;
use crate::error::FetchError;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, warn};

/// Consecutive same-class failures that mark a host unreachable.
pub const UNREACHABLE_THRESHOLD: usize = 3;

/// Connection-level failure classes tracked for host health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Dns,
    Tls,
    Connect,
    Timeout,
}

impl ErrorClass {
    /// Host-health class of a transport failure, if it has one.
    pub fn from_kind(kind: TransportErrorKind) -> Option<Self> {
        match kind {
            TransportErrorKind::Dns => Some(ErrorClass::Dns),
            TransportErrorKind::Tls => Some(ErrorClass::Tls),
            TransportErrorKind::Connect => Some(ErrorClass::Connect),
            TransportErrorKind::Timeout => Some(ErrorClass::Timeout),
            TransportErrorKind::Body | TransportErrorKind::Other => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ErrorClass::Dns => "DNS",
            ErrorClass::Tls => "TLS",
            ErrorClass::Connect => "connection",
            ErrorClass::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scheme + host (+ explicit port) of a URL; the raw string if it does not parse.
pub fn origin_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}", parsed.scheme(), host, port),
            (Some(host), None) => format!("{}://{}", parsed.scheme(), host),
            (None, _) => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Error history per origin, owned by one client instance.
#[derive(Debug, Default)]
pub struct HostHealth {
    history: HashMap<String, VecDeque<(ErrorClass, String)>>,
}

impl HostHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed attempt against `url`.
    ///
    /// `class` is `None` for failures that say nothing about reachability
    /// (HTTP status errors, body errors); those clear the origin's history.
    pub fn record_failure(
        &mut self,
        url: &str,
        class: Option<ErrorClass>,
        message: &str,
    ) -> Result<(), FetchError> {
        let origin = origin_of(url);
        let Some(class) = class else {
            self.clear_origin(&origin);
            return Ok(());
        };

        let entries = self.history.entry(origin.clone()).or_default();
        entries.push_back((class, message.to_string()));
        while entries.len() > UNREACHABLE_THRESHOLD {
            entries.pop_front();
        }
        debug!(origin = %origin, class = %class, recorded = entries.len(), "Recorded connection failure");

        if entries.len() == UNREACHABLE_THRESHOLD && entries.iter().all(|(c, _)| *c == class) {
            warn!(origin = %origin, class = %class, "Host marked unreachable");
            return Err(FetchError::HostUnreachable {
                host: origin,
                error_type: class,
                consecutive_failures: UNREACHABLE_THRESHOLD,
            });
        }
        Ok(())
    }

    /// Clear history after a successful response.
    pub fn record_success(&mut self, url: &str) {
        self.clear_origin(&origin_of(url));
    }

    /// Number of tracked failures for the origin of `url`.
    #[cfg(test)]
    pub fn failures_for(&self, url: &str) -> usize {
        self.history
            .get(&origin_of(url))
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    fn clear_origin(&mut self, origin: &str) {
        if self.history.remove(origin).is_some() {
            debug!(origin = %origin, "Cleared host error history");
        }
    }
}
