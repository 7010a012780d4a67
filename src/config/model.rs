//! Root config model and installed-kit records.

use super::network::NetworkConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry used when none is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://raw.githubusercontent.com/devcomfort/multikit/main/kits";

/// Schema version written to new config files.
pub const CONFIG_VERSION: &str = "0.1.0";

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_source() -> String {
    "remote".to_string()
}

/// Record of one installed kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledKit {
    /// Installed version.
    pub version: String,

    /// Installation source.
    #[serde(default = "default_source")]
    pub source: String,

    /// Committed file paths relative to `.github/`.
    #[serde(default)]
    pub files: Vec<String>,
}

impl InstalledKit {
    pub fn remote(version: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            version: version.into(),
            source: default_source(),
            files,
        }
    }

    /// Count tracked files installed under `subdir/`.
    pub fn count_in(&self, subdir: &str) -> usize {
        let prefix = format!("{}/", subdir);
        self.files.iter().filter(|f| f.starts_with(&prefix)).count()
    }
}

/// Root of the `[multikit]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultikitConfig {
    #[serde(default = "default_version")]
    pub version: String,

    /// Base URL of the remote kit registry.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub kits: BTreeMap<String, InstalledKit>,
}

impl Default for MultikitConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry_url: default_registry_url(),
            network: NetworkConfig::default(),
            kits: BTreeMap::new(),
        }
    }
}

impl MultikitConfig {
    pub fn is_installed(&self, kit_name: &str) -> bool {
        self.kits.contains_key(kit_name)
    }

    pub fn get_kit(&self, kit_name: &str) -> Option<&InstalledKit> {
        self.kits.get(kit_name)
    }

    /// Record an installation, replacing any prior record for the kit.
    pub fn record_install(&mut self, kit_name: &str, kit: InstalledKit) {
        self.kits.insert(kit_name.to_string(), kit);
    }

    pub fn remove_kit(&mut self, kit_name: &str) -> Option<InstalledKit> {
        self.kits.remove(kit_name)
    }
}
