//! Remote Fetch Client
//!
//! Fetches the registry index, kit manifests and kit files with retry,
//! exponential backoff, `Retry-After` handling, per-origin host-health
//! tracking and bounded concurrency. The HTTP layer sits behind
//! [`HttpTransport`] so the retry policy can be driven without a network.

pub mod backoff;
pub mod client;
pub mod health;
pub mod transport;

pub use backoff::{backoff_delay, parse_retry_after};
pub use client::{RemoteClient, RETRY_AFTER_THRESHOLD_SECS};
pub use health::{origin_of, ErrorClass, HostHealth, UNREACHABLE_THRESHOLD};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError, TransportErrorKind};
