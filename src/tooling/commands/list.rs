//! `list`

use super::{CommandEnv, CommandStatus};
use crate::config::{InstalledKit, MultikitConfig};
use crate::error::ApiError;
use crate::kit::{KitSubdir, Registry};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::collections::HashSet;
use tracing::warn;

const NOT_APPLICABLE: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitRow {
    pub name: String,
    pub installed: bool,
    pub version: String,
    pub agents: Option<usize>,
    pub prompts: Option<usize>,
}

impl KitRow {
    fn installed(name: &str, kit: &InstalledKit) -> Self {
        Self {
            name: name.to_string(),
            installed: true,
            version: kit.version.clone(),
            agents: Some(kit.count_in(KitSubdir::Agents.as_str())),
            prompts: Some(kit.count_in(KitSubdir::Prompts.as_str())),
        }
    }

    fn status(&self) -> &'static str {
        if self.installed {
            "✅ Installed"
        } else {
            "❌ Available"
        }
    }
}

pub async fn list(env: &CommandEnv<'_>) -> Result<CommandStatus, ApiError> {
    let config = env.load_config()?;
    let client = env.client(&config);
    let registry = match client.fetch_registry(&config.registry_url).await {
        Ok(registry) => Some(registry),
        Err(e) => {
            warn!(error = %e, "Registry fetch failed");
            env.console
                .warning("Could not fetch remote registry. Showing local kits only.");
            None
        }
    };
    client.close();

    let rows = merge_rows(&config, registry.as_ref());
    if rows.is_empty() {
        env.console.out("No kits found.");
    } else {
        env.console.out(format_kit_table(&rows));
    }
    Ok(CommandStatus::Success)
}

/// Registry kits in registry order, then installed kits the registry does not list.
///
/// Installed kits show the locally recorded version and file counts.
pub fn merge_rows(config: &MultikitConfig, registry: Option<&Registry>) -> Vec<KitRow> {
    let mut rows = Vec::new();
    let mut listed = HashSet::new();

    for entry in registry.map(Registry::kits).unwrap_or_default() {
        listed.insert(entry.name());
        rows.push(match config.get_kit(entry.name()) {
            Some(kit) => KitRow::installed(entry.name(), kit),
            None => KitRow {
                name: entry.name().to_string(),
                installed: false,
                version: entry.version().to_string(),
                agents: None,
                prompts: None,
            },
        });
    }

    for (name, kit) in &config.kits {
        if !listed.contains(name.as_str()) {
            rows.push(KitRow::installed(name, kit));
        }
    }
    rows
}

pub fn format_kit_table(rows: &[KitRow]) -> String {
    let count = |n: Option<usize>| n.map_or_else(|| NOT_APPLICABLE.to_string(), |n| n.to_string());
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Kit", "Status", "Version", "Agents", "Prompts"]);
    for row in rows {
        table.add_row(vec![
            row.name.clone(),
            row.status().to_string(),
            row.version.clone(),
            count(row.agents),
            count(row.prompts),
        ]);
    }
    table.to_string()
}
