//! Load and save of `multikit.toml`, with corruption recovery.

use super::model::MultikitConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_FILE_NAME: &str = "multikit.toml";

/// On-disk document: everything lives under the `[multikit]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    multikit: MultikitConfig,
}

/// Details of a recovery from a corrupted config file.
#[derive(Debug, Clone)]
pub struct ConfigRecovery {
    /// Where the corrupted file was copied, if the backup succeeded.
    pub backup_path: Option<PathBuf>,
    /// Parse or validation error that triggered the recovery.
    pub reason: String,
}

/// Result of loading the config: the effective value plus any recovery performed.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MultikitConfig,
    pub recovered: Option<ConfigRecovery>,
}

pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// Load the config, reporting corruption recovery to the caller.
///
/// A missing file yields defaults. A file that cannot be parsed or fails
/// validation is backed up as `multikit.toml.corrupted.<timestamp>` and
/// defaults are returned. Only an unreadable file is an error.
pub fn load_config_with_recovery(project_dir: &Path) -> Result<LoadedConfig, ConfigError> {
    let path = config_path(project_dir);
    if !path.exists() {
        debug!(path = %path.display(), "Config file absent, using defaults");
        return Ok(LoadedConfig {
            config: MultikitConfig::default(),
            recovered: None,
        });
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    match toml::from_str::<ConfigDocument>(&content) {
        Ok(document) => Ok(LoadedConfig {
            config: document.multikit,
            recovered: None,
        }),
        Err(e) => {
            let reason = e.to_string();
            warn!(path = %path.display(), error = %reason, "Corrupted config detected");
            let backup_path = backup_corrupted_config(&path);
            Ok(LoadedConfig {
                config: MultikitConfig::default(),
                recovered: Some(ConfigRecovery {
                    backup_path,
                    reason,
                }),
            })
        }
    }
}

fn backup_corrupted_config(path: &Path) -> Option<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let backup = path.with_file_name(format!("{}.corrupted.{}", CONFIG_FILE_NAME, timestamp));
    match std::fs::copy(path, &backup) {
        Ok(_) => {
            info!(backup = %backup.display(), "Backed up corrupted config");
            Some(backup)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to back up corrupted config");
            None
        }
    }
}

/// Write the config atomically: temp file in the project dir, then rename.
pub fn save_config(project_dir: &Path, config: &MultikitConfig) -> Result<(), ConfigError> {
    let path = config_path(project_dir);
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.clone(),
        source,
    };

    let document = ConfigDocument {
        multikit: config.clone(),
    };
    let content = toml::to_string_pretty(&document)?;

    std::fs::create_dir_all(project_dir).map_err(write_err)?;
    let mut temp = tempfile::NamedTempFile::new_in(project_dir).map_err(write_err)?;
    temp.write_all(content.as_bytes()).map_err(write_err)?;
    temp.flush().map_err(write_err)?;
    temp.persist(&path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), kits = config.kits.len(), "Saved config");
    Ok(())
}

/// Write a default config unless one already exists. Returns whether a file was created.
pub fn create_default_config(project_dir: &Path) -> Result<bool, ConfigError> {
    if config_path(project_dir).exists() {
        return Ok(false);
    }
    save_config(project_dir, &MultikitConfig::default())?;
    Ok(true)
}
