//! `init`

use super::{CommandEnv, CommandStatus};
use crate::config::create_default_config;
use crate::error::{ApiError, ConfigError};
use crate::installer::github_dir;
use crate::kit::KitSubdir;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn init(env: &CommandEnv<'_>, path: &Path) -> Result<CommandStatus, ApiError> {
    let target = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env.project_dir.join(path)
    };

    match initialize(&target) {
        Ok((dir, created)) => {
            info!(dir = %dir.display(), config_created = created, "Project initialized");
            env.console
                .success(format!("Initialized multikit in {}", dir.display()));
            Ok(CommandStatus::Success)
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            env.console.failure(format!(
                "Permission denied: cannot write to {}",
                target.display()
            ));
            Ok(CommandStatus::Failure)
        }
        Err(e) => {
            env.console
                .failure(format!("Error initializing project: {}", e));
            Ok(CommandStatus::Failure)
        }
    }
}

/// Create the kit directories and a default config. Returns the canonical
/// project dir and whether a config file was written.
fn initialize(target: &Path) -> std::io::Result<(PathBuf, bool)> {
    let github = github_dir(target);
    for subdir in [KitSubdir::Agents, KitSubdir::Prompts] {
        std::fs::create_dir_all(github.join(subdir.as_str()))?;
    }
    let created = create_default_config(target).map_err(|e| match e {
        ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => source,
        other => std::io::Error::new(ErrorKind::Other, other.to_string()),
    })?;
    Ok((target.canonicalize()?, created))
}
