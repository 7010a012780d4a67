//! Error types for multikit.
//!
//! Each concern owns a focused error enum; `ApiError` is the umbrella the
//! command layer reports from.

use crate::remote::ErrorClass;
use std::path::PathBuf;
use thiserror::Error;

/// A field-level validation failure raised by a model constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures surfaced by the remote fetch client.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Three consecutive same-class connection failures against one origin.
    #[error("Host {host} unreachable: {consecutive_failures} consecutive {error_type} errors")]
    HostUnreachable {
        host: String,
        error_type: ErrorClass,
        consecutive_failures: usize,
    },

    #[error("Rate limited fetching {url}: Retry-After {retry_after_secs}s exceeds >60s threshold")]
    RateLimitExceeded {
        url: String,
        retry_after_secs: f64,
        attempts: usize,
    },

    #[error("Failed after {attempts} attempts: {url} ({last_error})")]
    RetryExhausted {
        url: String,
        attempts: usize,
        last_error: String,
    },

    /// A 4xx response other than 429; never retried.
    #[error("HTTP {status} from {url}")]
    ClientStatus {
        url: String,
        status: u16,
        attempts: usize,
    },

    #[error("Invalid response from {url}: {reason}")]
    InvalidPayload { url: String, reason: String },
}

impl FetchError {
    /// Number of attempts made before the error surfaced, when tracked.
    pub fn attempts(&self) -> Option<usize> {
        match self {
            FetchError::RateLimitExceeded { attempts, .. }
            | FetchError::RetryExhausted { attempts, .. }
            | FetchError::ClientStatus { attempts, .. } => Some(*attempts),
            FetchError::HostUnreachable {
                consecutive_failures,
                ..
            } => Some(*consecutive_failures),
            FetchError::InvalidPayload { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::ClientStatus { status: 404, .. })
    }
}

/// Persisted config errors that cannot be recovered by falling back to defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Failures while staging, comparing or committing a kit.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Failed to fetch manifest for '{kit}': {source}")]
    Manifest {
        kit: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to download kit files: {0}")]
    Download(#[source] FetchError),

    #[error("Failed to stage {path}: {source}")]
    Staging {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read local {path}: {source}")]
    LocalRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to commit {path}: {source}")]
    Commit {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error type for command execution.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Kit '{0}' is not installed")]
    KitNotInstalled(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
