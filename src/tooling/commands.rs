//! Command orchestrators.
//!
//! Each command loads the project config once, drives the remote client and
//! installer, prints glyph-prefixed results through the [`Console`] and
//! returns a [`CommandStatus`]. Expected failures (missing kit, network
//! errors) are reported and turned into `CommandStatus::Failure`; only
//! unexpected local errors propagate as `Err`.

pub mod diff;
pub mod init;
pub mod install;
pub mod list;
pub mod uninstall;

use crate::config::sources::environment::effective_network;
use crate::config::{load_config_with_recovery, MultikitConfig, CONFIG_FILE_NAME};
use crate::console::Console;
use crate::error::{ApiError, FetchError, InstallError};
use crate::installer::ConflictResolver;
use crate::remote::{HttpTransport, RemoteClient};
use crate::tooling::select::{KitChoice, KitSelector};
use std::path::Path;
use std::sync::Arc;

/// Process exit status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::Failure => 1,
        }
    }

    pub fn from_success(ok: bool) -> Self {
        if ok {
            CommandStatus::Success
        } else {
            CommandStatus::Failure
        }
    }
}

/// Collaborators shared by every command invocation.
pub struct CommandEnv<'a> {
    pub project_dir: &'a Path,
    pub console: &'a Console,
    /// Transport override; `None` uses a fresh reqwest transport per command.
    pub transport: Option<Arc<dyn HttpTransport>>,
    pub resolver: &'a mut dyn ConflictResolver,
    pub selector: &'a mut dyn KitSelector,
}

impl CommandEnv<'_> {
    /// Load the config, reporting any corruption recovery on stderr.
    pub fn load_config(&self) -> Result<MultikitConfig, ApiError> {
        let loaded = load_config_with_recovery(self.project_dir)?;
        if let Some(recovery) = &loaded.recovered {
            if let Some(backup) = &recovery.backup_path {
                self.console
                    .err(format!("Backed up corrupted config to {}", backup.display()));
            }
            self.console.warning(format!(
                "Corrupted {} detected, backed up and using defaults. Error: {}",
                CONFIG_FILE_NAME, recovery.reason
            ));
        }
        Ok(loaded.config)
    }

    /// A fetch client for one command, tuned by config plus environment overrides.
    pub fn client(&self, config: &MultikitConfig) -> RemoteClient {
        let network = effective_network(&config.network);
        match &self.transport {
            Some(transport) => RemoteClient::with_transport(network, Arc::clone(transport)),
            None => RemoteClient::new(network),
        }
    }
}

/// Installed kits as selection choices, in name order.
pub(crate) fn installed_choices(config: &MultikitConfig) -> Vec<KitChoice> {
    config
        .kits
        .iter()
        .map(|(name, kit)| KitChoice::new(name.clone(), kit.version.clone()))
        .collect()
}

/// One-line message for a failed network operation.
pub(crate) fn describe_fetch_failure(action: &str, err: &FetchError) -> String {
    match err {
        FetchError::RetryExhausted {
            attempts,
            last_error,
            ..
        } => format!("Failed to {} after {} attempts: {}", action, attempts, last_error),
        FetchError::ClientStatus { status, .. } => {
            format!("HTTP error {} while trying to {}", status, action)
        }
        other => format!("Failed to {}: {}", action, other),
    }
}

/// One-line message for a failed kit install.
pub(crate) fn describe_install_error(kit: &str, err: &InstallError) -> String {
    match err {
        InstallError::Manifest { source, .. } if source.is_not_found() => {
            format!("Kit '{}' not found", kit)
        }
        InstallError::Manifest { source, .. } => describe_fetch_failure("fetch manifest", source),
        InstallError::Download(FetchError::ClientStatus {
            url, status: 404, ..
        }) => format!("File not found: {}", url),
        InstallError::Download(source) => describe_fetch_failure("download kit files", source),
        other => format!("Installation failed: {}", other),
    }
}
