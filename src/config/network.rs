//! Network tuning knobs for the remote fetch client.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=32;
const RETRIES_RANGE: RangeInclusive<usize> = 0..=10;
const BASE_DELAY_RANGE: RangeInclusive<f64> = 0.1..=5.0;
const MAX_DELAY_RANGE: RangeInclusive<f64> = 0.5..=30.0;

fn default_max_concurrency() -> usize {
    8
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_base_delay() -> f64 {
    0.5
}

fn default_retry_max_delay() -> f64 {
    2.0
}

#[derive(Debug, Deserialize)]
struct RawNetworkConfig {
    #[serde(default = "default_max_concurrency")]
    max_concurrency: usize,
    #[serde(default = "default_max_retries")]
    max_retries: usize,
    #[serde(default = "default_retry_base_delay")]
    retry_base_delay: f64,
    #[serde(default = "default_retry_max_delay")]
    retry_max_delay: f64,
}

/// Validated retry/concurrency settings. Delays are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetworkConfig")]
pub struct NetworkConfig {
    max_concurrency: usize,
    max_retries: usize,
    retry_base_delay: f64,
    retry_max_delay: f64,
}

impl TryFrom<RawNetworkConfig> for NetworkConfig {
    type Error = ValidationError;

    fn try_from(raw: RawNetworkConfig) -> Result<Self, Self::Error> {
        NetworkConfig::new(
            raw.max_concurrency,
            raw.max_retries,
            raw.retry_base_delay,
            raw.retry_max_delay,
        )
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            max_retries: default_max_retries(),
            retry_base_delay: default_retry_base_delay(),
            retry_max_delay: default_retry_max_delay(),
        }
    }
}

impl NetworkConfig {
    pub fn new(
        max_concurrency: usize,
        max_retries: usize,
        retry_base_delay: f64,
        retry_max_delay: f64,
    ) -> Result<Self, ValidationError> {
        if !CONCURRENCY_RANGE.contains(&max_concurrency) {
            return Err(out_of_range("max_concurrency", max_concurrency, &CONCURRENCY_RANGE));
        }
        if !RETRIES_RANGE.contains(&max_retries) {
            return Err(out_of_range("max_retries", max_retries, &RETRIES_RANGE));
        }
        if !BASE_DELAY_RANGE.contains(&retry_base_delay) {
            return Err(out_of_range("retry_base_delay", retry_base_delay, &BASE_DELAY_RANGE));
        }
        if !MAX_DELAY_RANGE.contains(&retry_max_delay) {
            return Err(out_of_range("retry_max_delay", retry_max_delay, &MAX_DELAY_RANGE));
        }
        Ok(Self {
            max_concurrency,
            max_retries,
            retry_base_delay,
            retry_max_delay,
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_base_delay)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_max_delay)
    }

    pub fn retry_base_delay_secs(&self) -> f64 {
        self.retry_base_delay
    }

    pub fn retry_max_delay_secs(&self) -> f64 {
        self.retry_max_delay
    }
}

fn out_of_range<T: std::fmt::Display>(
    field: &str,
    value: T,
    range: &RangeInclusive<T>,
) -> ValidationError {
    ValidationError::new(
        field,
        format!(
            "must be between {} and {}, got {}",
            range.start(),
            range.end(),
            value
        ),
    )
}
