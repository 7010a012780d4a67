//! `diff`

use super::{describe_fetch_failure, installed_choices, CommandEnv, CommandStatus};
use crate::config::MultikitConfig;
use crate::diff::{generate_diff, render_diff};
use crate::error::ApiError;
use crate::installer::{github_dir, read_local};
use crate::remote::RemoteClient;
use tracing::{debug, warn};

pub async fn diff(env: &mut CommandEnv<'_>, kit: Option<&str>) -> Result<CommandStatus, ApiError> {
    let config = env.load_config()?;

    let kits = match kit {
        Some(kit) => vec![kit.to_string()],
        None => {
            let choices = installed_choices(&config);
            if choices.is_empty() {
                env.console.out("No kits installed.");
                return Ok(CommandStatus::Success);
            }
            env.selector.select_many("Select kits to diff:", &choices)?
        }
    };

    let client = env.client(&config);
    let mut clean = true;
    for kit in &kits {
        clean &= diff_kit(env, &client, &config, kit).await?;
    }
    client.close();
    Ok(CommandStatus::from_success(clean))
}

/// Compare one installed kit with the registry. Returns `true` when nothing differs.
async fn diff_kit(
    env: &CommandEnv<'_>,
    client: &RemoteClient,
    config: &MultikitConfig,
    kit: &str,
) -> Result<bool, ApiError> {
    let console = env.console;
    let Some(installed) = config.get_kit(kit) else {
        console.failure(ApiError::KitNotInstalled(kit.to_string()).to_string());
        return Ok(false);
    };

    let manifest = match client.fetch_manifest(&config.registry_url, kit).await {
        Ok(manifest) => manifest,
        Err(e) if e.is_not_found() => {
            console.failure(format!("Kit '{}' not found in remote registry", kit));
            return Ok(false);
        }
        Err(e) => {
            console.failure(describe_fetch_failure("fetch manifest", &e));
            return Ok(false);
        }
    };

    console.out(format!(
        "Comparing {} (local v{} ↔ remote v{})",
        kit,
        installed.version,
        manifest.version()
    ));
    console.out("");

    let github = github_dir(env.project_dir);
    let mut changed = 0usize;
    let mut unchanged = 0usize;
    for file in manifest.all_files() {
        let rel_path = file.relative_path();
        let remote = match client.fetch_file(&config.registry_url, kit, &file).await {
            Ok(body) => body,
            Err(e) => {
                warn!(file = %rel_path, error = %e, "Remote file fetch failed");
                console.err(format!(
                    "  {} Could not fetch remote {}",
                    console.warn_mark(),
                    rel_path
                ));
                continue;
            }
        };

        let Some(local) = read_local(&github.join(file.subdir.as_str()).join(&file.filename))? else {
            console.out(format!("  {} Local file missing: {}", console.fail_mark(), rel_path));
            changed += 1;
            continue;
        };

        let lines = generate_diff(
            &String::from_utf8_lossy(&local),
            &String::from_utf8_lossy(&remote),
            &format!("local/{}", file.filename),
            &format!("remote/{}", file.filename),
        );
        if lines.is_empty() {
            unchanged += 1;
        } else {
            console.write(&render_diff(&lines, console.color()));
            changed += 1;
        }
    }

    debug!(kit, changed, unchanged, "Diff complete");
    console.out("");
    if changed == 0 {
        console.success(format!("No changes detected for {}", kit));
        Ok(true)
    } else {
        console.success(format!("{} file(s) changed, {} unchanged", changed, unchanged));
        Ok(false)
    }
}
