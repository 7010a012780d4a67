//! Environment variable source: MULTIKIT_NETWORK_* overrides for network tuning.

use crate::config::NetworkConfig;
use config::{Config, ConfigError, Environment};

/// Prefix for per-process network overrides, e.g. `MULTIKIT_NETWORK_MAX_RETRIES`.
pub const NETWORK_ENV_PREFIX: &str = "MULTIKIT_NETWORK";

fn network_env() -> Environment {
    Environment::with_prefix(NETWORK_ENV_PREFIX).try_parsing(true)
}

/// Layer `MULTIKIT_NETWORK_*` variables over `base`, keeping `base` when the
/// overlay is invalid.
///
/// The result is validated with the same ranges as the persisted values and is
/// never written back to `multikit.toml`.
pub fn effective_network(base: &NetworkConfig) -> NetworkConfig {
    effective_with(base, network_env())
}

fn overlay(base: &NetworkConfig, env: Environment) -> Result<NetworkConfig, ConfigError> {
    let config = Config::builder()
        .add_source(Config::try_from(base)?)
        .add_source(env)
        .build()?;
    config.try_deserialize()
}

fn effective_with(base: &NetworkConfig, env: Environment) -> NetworkConfig {
    match overlay(base, env) {
        Ok(network) => network,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid {}_* overrides", NETWORK_ENV_PREFIX);
            *base
        }
    }
}
