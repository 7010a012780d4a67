//! `uninstall`

use super::{installed_choices, CommandEnv, CommandStatus};
use crate::config::save_config;
use crate::error::ApiError;
use crate::installer::{delete_kit_files, github_dir};
use tracing::info;

pub fn uninstall(env: &mut CommandEnv<'_>, kit: Option<&str>) -> Result<CommandStatus, ApiError> {
    let mut config = env.load_config()?;

    let kit = match kit {
        Some(kit) => kit.to_string(),
        None => {
            let choices = installed_choices(&config);
            if choices.is_empty() {
                env.console.out("No kits installed.");
                return Ok(CommandStatus::Success);
            }
            match env.selector.select_one("Select a kit to uninstall:", &choices)? {
                Some(kit) => kit,
                None => return Ok(CommandStatus::Success),
            }
        }
    };

    let Some(installed) = config.remove_kit(&kit) else {
        env.console
            .failure(ApiError::KitNotInstalled(kit).to_string());
        return Ok(CommandStatus::Failure);
    };

    let removed = delete_kit_files(&github_dir(env.project_dir), &installed.files)?;
    save_config(env.project_dir, &config)?;

    info!(kit = %kit, removed, "Kit uninstalled");
    env.console
        .success(format!("Uninstalled {} ({} files removed)", kit, removed));
    Ok(CommandStatus::Success)
}
