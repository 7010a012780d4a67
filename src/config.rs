//! Persisted project configuration (`multikit.toml`).
//!
//! The config is loaded once per command, mutated in memory and written back
//! atomically after a successful operation.

pub mod model;
pub mod network;
pub mod sources;
pub mod store;

pub use model::{InstalledKit, MultikitConfig, CONFIG_VERSION, DEFAULT_REGISTRY_URL};
pub use network::NetworkConfig;
pub use store::{
    config_path, create_default_config, load_config_with_recovery, save_config,
    ConfigRecovery, LoadedConfig, CONFIG_FILE_NAME,
};
