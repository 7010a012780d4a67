//! Retrying fetch client for the kit registry.

use super::backoff::{backoff_delay, parse_retry_after};
use super::health::{ErrorClass, HostHealth};
use super::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::config::NetworkConfig;
use crate::error::FetchError;
use crate::kit::{KitFile, Manifest, Registry};
use futures::future::try_join_all;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// A 429 asking for a longer wait than this fails immediately.
pub const RETRY_AFTER_THRESHOLD_SECS: f64 = 60.0;

/// HTTP client with retry, backoff, `Retry-After` handling and host-health
/// tracking. Host history is per instance; build one client per command.
pub struct RemoteClient {
    transport: Arc<dyn HttpTransport>,
    owns_transport: bool,
    network: NetworkConfig,
    health: Mutex<HostHealth>,
    closed: AtomicBool,
}

/// What to do after one attempt that did not succeed.
enum Outcome {
    Retry { wait: Duration, error: String },
    Fail(FetchError),
}

impl RemoteClient {
    /// Client over a lazily-created reqwest transport that it owns and closes.
    pub fn new(network: NetworkConfig) -> Self {
        Self::with_owned_transport(network, Arc::new(ReqwestTransport::new()))
    }

    /// Client that takes ownership of `transport` and closes it on [`close`](Self::close).
    pub fn with_owned_transport(network: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::build(network, transport, true)
    }

    /// Client over a caller-supplied transport. The transport is never closed by the client.
    pub fn with_transport(network: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self::build(network, transport, false)
    }

    fn build(network: NetworkConfig, transport: Arc<dyn HttpTransport>, owns_transport: bool) -> Self {
        Self {
            transport,
            owns_transport,
            network,
            health: Mutex::new(HostHealth::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Fetch `url`, retrying transient failures.
    ///
    /// At least one attempt is made even when `max_retries` is 0.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let max_attempts = self.network.max_retries().max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            debug!(url, attempt = attempt + 1, max_attempts, "Fetching");
            let outcome = match self.transport.get(url).await {
                Ok(response) if response.is_success() => {
                    self.health.lock().record_success(url);
                    return Ok(response.body);
                }
                Ok(response) => self.handle_status(url, attempt, response),
                Err(err) => {
                    let class = ErrorClass::from_kind(err.kind);
                    match self.health.lock().record_failure(url, class, &err.message) {
                        Ok(()) => Outcome::Retry {
                            wait: self.backoff(attempt),
                            error: err.to_string(),
                        },
                        Err(unreachable) => Outcome::Fail(unreachable),
                    }
                }
            };

            match outcome {
                Outcome::Fail(err) => return Err(err),
                Outcome::Retry { wait, error } => {
                    if attempt + 1 < max_attempts {
                        warn!(
                            url,
                            attempt = attempt + 1,
                            error = %error,
                            delay_ms = wait.as_millis() as u64,
                            "Fetch failed, retrying"
                        );
                        tokio::time::sleep(wait).await;
                    }
                    last_error = error;
                }
            }
        }

        warn!(url, attempts = max_attempts, error = %last_error, "Retries exhausted");
        Err(FetchError::RetryExhausted {
            url: url.to_string(),
            attempts: max_attempts,
            last_error,
        })
    }

    fn handle_status(&self, url: &str, attempt: usize, response: HttpResponse) -> Outcome {
        // The host answered, so connection-level history no longer applies.
        self.health.lock().record_success(url);
        let status = response.status;

        if status == 429 {
            let retry_after = parse_retry_after(response.retry_after.as_deref());
            return match retry_after {
                Some(secs) if secs > RETRY_AFTER_THRESHOLD_SECS => {
                    warn!(url, retry_after = secs, "Rate limit wait exceeds threshold");
                    Outcome::Fail(FetchError::RateLimitExceeded {
                        url: url.to_string(),
                        retry_after_secs: secs,
                        attempts: attempt + 1,
                    })
                }
                Some(secs) => {
                    info!(url, retry_after = secs, "Rate limited, honoring Retry-After");
                    Outcome::Retry {
                        wait: Duration::from_secs_f64(secs),
                        error: format!("HTTP 429 (Retry-After {}s)", secs),
                    }
                }
                None => Outcome::Retry {
                    wait: self.backoff(attempt),
                    error: "HTTP 429".to_string(),
                },
            };
        }

        if (400..500).contains(&status) {
            return Outcome::Fail(FetchError::ClientStatus {
                url: url.to_string(),
                status,
                attempts: attempt + 1,
            });
        }

        Outcome::Retry {
            wait: self.backoff(attempt),
            error: format!("HTTP {}", status),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        backoff_delay(
            attempt,
            self.network.retry_base_delay(),
            self.network.retry_max_delay(),
        )
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let body = self.fetch(url).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::InvalidPayload {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// `GET {base}/registry.json`
    pub async fn fetch_registry(&self, base_url: &str) -> Result<Registry, FetchError> {
        self.fetch_json(&registry_url(base_url)).await
    }

    /// `GET {base}/{kit}/manifest.json`
    pub async fn fetch_manifest(&self, base_url: &str, kit: &str) -> Result<Manifest, FetchError> {
        self.fetch_json(&manifest_url(base_url, kit)).await
    }

    /// `GET {base}/{kit}/{subdir}/{filename}`
    pub async fn fetch_file(
        &self,
        base_url: &str,
        kit: &str,
        file: &KitFile,
    ) -> Result<Vec<u8>, FetchError> {
        self.fetch(&file_url(base_url, kit, file)).await
    }

    /// Fetch every file with at most `max_concurrency` requests in flight.
    ///
    /// Results keep the input order. The first failure is returned and all
    /// other in-flight fetches are dropped.
    pub async fn fetch_files(
        &self,
        base_url: &str,
        kit: &str,
        files: &[KitFile],
    ) -> Result<Vec<(KitFile, Vec<u8>)>, FetchError> {
        let semaphore = Semaphore::new(self.network.max_concurrency());
        let semaphore = &semaphore;
        let fetches = files.iter().map(|file| async move {
            let _permit = semaphore
                .acquire()
                .await
                .map_err(|e| FetchError::InvalidPayload {
                    url: file_url(base_url, kit, file),
                    reason: e.to_string(),
                })?;
            info!(kit, file = %file, "Downloading");
            let body = self.fetch_file(base_url, kit, file).await?;
            Ok((file.clone(), body))
        });
        try_join_all(fetches).await
    }

    /// Release the transport if this client owns it. Safe to call repeatedly.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.owns_transport {
            self.transport.close();
        }
    }
}

impl Drop for RemoteClient {
    fn drop(&mut self) {
        self.close();
    }
}

fn trim_base(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

pub fn registry_url(base_url: &str) -> String {
    format!("{}/registry.json", trim_base(base_url))
}

pub fn manifest_url(base_url: &str, kit: &str) -> String {
    format!("{}/{}/manifest.json", trim_base(base_url), kit)
}

pub fn file_url(base_url: &str, kit: &str, file: &KitFile) -> String {
    format!(
        "{}/{}/{}/{}",
        trim_base(base_url),
        kit,
        file.subdir,
        file.filename
    )
}
