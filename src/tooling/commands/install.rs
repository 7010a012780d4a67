//! `install` and `update`.

use super::{describe_install_error, installed_choices, CommandEnv, CommandStatus};
use crate::config::{save_config, MultikitConfig};
use crate::error::ApiError;
use crate::installer::Installer;
use crate::kit::validate_kit_name;
use crate::remote::RemoteClient;
use crate::tooling::select::KitChoice;
use tracing::{info, warn};

/// Options shared by `install` and `update`.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions<'a> {
    pub kit: Option<&'a str>,
    pub force: bool,
    /// Registry override for this invocation only.
    pub registry: Option<&'a str>,
}

pub async fn install(env: &mut CommandEnv<'_>, opts: InstallOptions<'_>) -> Result<CommandStatus, ApiError> {
    let mut config = env.load_config()?;
    let registry_url = opts.registry.unwrap_or(&config.registry_url).to_string();
    let client = env.client(&config);

    let status = match opts.kit {
        Some(kit) => {
            let ok = install_one(env, &client, &registry_url, kit, opts.force, &mut config).await?;
            CommandStatus::from_success(ok)
        }
        None => {
            let registry = match client.fetch_registry(&registry_url).await {
                Ok(registry) => registry,
                Err(e) => {
                    warn!(error = %e, "Registry fetch failed");
                    env.console
                        .failure("Cannot fetch registry for interactive selection.");
                    return Ok(CommandStatus::Failure);
                }
            };
            let choices: Vec<KitChoice> = registry
                .kits()
                .iter()
                .filter(|entry| !config.is_installed(entry.name()))
                .map(|entry| KitChoice::new(entry.name(), entry.version()))
                .collect();
            if choices.is_empty() {
                env.console.out("No kits available to install.");
                return Ok(CommandStatus::Success);
            }
            let selected = env.selector.select_many("Select kits to install:", &choices)?;

            let mut failed = Vec::new();
            for kit in &selected {
                if !install_one(env, &client, &registry_url, kit, opts.force, &mut config).await? {
                    failed.push(kit.as_str());
                }
            }
            report_batch(env, "install", &failed)
        }
    };

    client.close();
    Ok(status)
}

pub async fn update(env: &mut CommandEnv<'_>, opts: InstallOptions<'_>) -> Result<CommandStatus, ApiError> {
    let mut config = env.load_config()?;
    let registry_url = opts.registry.unwrap_or(&config.registry_url).to_string();

    let (kits, batch) = match opts.kit {
        Some(kit) => (vec![kit.to_string()], false),
        None => {
            let choices = installed_choices(&config);
            if choices.is_empty() {
                env.console.out("No kits installed.");
                return Ok(CommandStatus::Success);
            }
            (env.selector.select_many("Select kits to update:", &choices)?, true)
        }
    };

    let client = env.client(&config);
    let mut failed = Vec::new();
    for kit in &kits {
        if !config.is_installed(kit) {
            env.console
                .failure(ApiError::KitNotInstalled(kit.clone()).to_string());
            failed.push(kit.as_str());
            continue;
        }
        env.console.out(format!("Updating '{}'...", kit));
        if !install_one(env, &client, &registry_url, kit, opts.force, &mut config).await? {
            failed.push(kit.as_str());
        }
    }
    client.close();

    Ok(if batch {
        report_batch(env, "update", &failed)
    } else {
        CommandStatus::from_success(failed.is_empty())
    })
}

/// Install one kit and persist the config. Returns whether it succeeded.
///
/// The installer works on a copy of the config so a failed save never leaves
/// the in-memory record ahead of the file on disk.
async fn install_one(
    env: &mut CommandEnv<'_>,
    client: &RemoteClient,
    registry_url: &str,
    kit: &str,
    force: bool,
    config: &mut MultikitConfig,
) -> Result<bool, ApiError> {
    if let Err(e) = validate_kit_name("kit", kit) {
        env.console.failure(e.reason);
        return Ok(false);
    }

    let mut candidate = config.clone();
    let installer = Installer::new(client, registry_url, env.project_dir, env.console);
    let report = match installer
        .install(kit, force, &mut *env.resolver, &mut candidate)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            warn!(kit, error = %e, "Install failed");
            env.console.failure(describe_install_error(kit, &e));
            return Ok(false);
        }
    };

    if let Err(e) = save_config(env.project_dir, &candidate) {
        env.console.failure(e.to_string());
        return Ok(false);
    }
    *config = candidate;

    info!(
        kit,
        version = %report.version,
        installed = report.installed.len(),
        skipped = report.skipped.len(),
        "Kit installed"
    );
    env.console
        .success(format!("Installed {} v{}", report.kit, report.version));
    Ok(true)
}

fn report_batch(env: &CommandEnv<'_>, action: &str, failed: &[&str]) -> CommandStatus {
    if failed.is_empty() {
        return CommandStatus::Success;
    }
    env.console.err(format!(
        "\n{} Failed to {}: {}",
        env.console.fail_mark(),
        action,
        failed.join(", ")
    ));
    CommandStatus::Failure
}
