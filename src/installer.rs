//! Atomic Installer
//!
//! Installs or updates a kit as one unit. Every declared file is downloaded
//! into a private staging directory first; only after all downloads succeed
//! are local conflicts resolved and the chosen files moved into the live
//! `.github/` tree. A failure before the move leaves the live tree and the
//! in-memory config untouched.

mod conflict;
mod staging;

pub use conflict::{ConflictResolver, FixedResolver, InteractiveResolver, OverwriteChoice};
pub use staging::{delete_kit_files, read_local, StagingArea};

use crate::config::{InstalledKit, MultikitConfig};
use crate::console::Console;
use crate::diff::show_diff;
use crate::error::InstallError;
use crate::kit::KitFile;
use crate::remote::RemoteClient;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory under the project root that receives kit files.
pub const GITHUB_DIR: &str = ".github";

pub fn github_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(GITHUB_DIR)
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub kit: String,
    pub version: String,
    /// Relative paths committed to the live tree, in manifest order.
    pub installed: Vec<String>,
    /// Subset of `installed` whose local copy already matched.
    pub unchanged: Vec<String>,
    /// Conflicting files left as they were.
    pub skipped: Vec<String>,
    pub declared_no_files: bool,
}

/// Files chosen for commit after conflict resolution.
#[derive(Debug, Default)]
struct CommitPlan {
    marked: Vec<KitFile>,
    unchanged: Vec<String>,
    skipped: Vec<String>,
}

/// Installs kits from one registry into one project.
pub struct Installer<'a> {
    client: &'a RemoteClient,
    registry_url: &'a str,
    github_dir: PathBuf,
    console: &'a Console,
}

impl<'a> Installer<'a> {
    pub fn new(
        client: &'a RemoteClient,
        registry_url: &'a str,
        project_dir: &Path,
        console: &'a Console,
    ) -> Self {
        Self {
            client,
            registry_url,
            github_dir: github_dir(project_dir),
            console,
        }
    }

    /// Install `kit`, recording it in `config` on success.
    ///
    /// `force` overwrites every conflicting file without consulting `resolver`.
    /// On error `config` is not modified.
    pub async fn install(
        &self,
        kit: &str,
        force: bool,
        resolver: &mut dyn ConflictResolver,
        config: &mut MultikitConfig,
    ) -> Result<InstallReport, InstallError> {
        self.console.out(format!("Fetching manifest for '{}'...", kit));
        let manifest = self
            .client
            .fetch_manifest(self.registry_url, kit)
            .await
            .map_err(|source| InstallError::Manifest {
                kit: kit.to_string(),
                source,
            })?;

        let declared_no_files = manifest.is_empty();
        if declared_no_files {
            self.console
                .warning(format!("Kit '{}' declares no files to install", kit));
        }

        self.console
            .out(format!("Downloading {} v{}...", kit, manifest.version()));
        let files = manifest.all_files();
        let staging = StagingArea::new()?;
        for file in &files {
            self.console.out(format!("  Downloading {}...", file));
        }
        let downloads = self
            .client
            .fetch_files(self.registry_url, kit, &files)
            .await
            .map_err(InstallError::Download)?;
        for (file, content) in &downloads {
            staging.stage_file(file, content)?;
        }
        info!(kit, files = files.len(), "Staged kit files");

        let plan = self.plan_commit(&staging, &files, force, resolver)?;
        let installed = staging.move_staged_files(&self.github_dir, &plan.marked)?;
        info!(kit, installed = installed.len(), skipped = plan.skipped.len(), "Committed kit files");

        config.record_install(
            kit,
            InstalledKit::remote(manifest.version(), installed.clone()),
        );

        Ok(InstallReport {
            kit: kit.to_string(),
            version: manifest.version().to_string(),
            installed,
            unchanged: plan.unchanged,
            skipped: plan.skipped,
            declared_no_files,
        })
    }

    /// Compare each staged file with its live counterpart and decide what to commit.
    fn plan_commit(
        &self,
        staging: &StagingArea,
        files: &[KitFile],
        force: bool,
        resolver: &mut dyn ConflictResolver,
    ) -> Result<CommitPlan, InstallError> {
        let mut plan = CommitPlan::default();
        let mut overwrite_all = force;
        let mut skip_all = false;

        for file in files {
            let rel_path = file.relative_path();
            if skip_all {
                self.skip(&mut plan, rel_path);
                continue;
            }

            let local_path = self.github_dir.join(file.subdir.as_str()).join(&file.filename);
            let local = read_local(&local_path).map_err(|source| InstallError::LocalRead {
                path: rel_path.clone(),
                source,
            })?;
            let Some(local) = local else {
                plan.marked.push(file.clone());
                continue;
            };

            let staged = staging.read_staged(file)?;
            if local == staged {
                self.console
                    .out(format!("  {} {} (unchanged)", self.console.ok_mark(), rel_path));
                plan.unchanged.push(rel_path);
                plan.marked.push(file.clone());
                continue;
            }
            if overwrite_all {
                debug!(file = %rel_path, "Overwriting without prompt");
                plan.marked.push(file.clone());
                continue;
            }

            self.console.out(format!("\n  Conflict: {}", rel_path));
            let diff = show_diff(
                &String::from_utf8_lossy(&local),
                &String::from_utf8_lossy(&staged),
                &file.filename,
                self.console.color(),
            );
            self.console.write(&diff.text);

            match resolver.resolve(&rel_path) {
                OverwriteChoice::Yes => plan.marked.push(file.clone()),
                OverwriteChoice::No => self.skip(&mut plan, rel_path),
                OverwriteChoice::All => {
                    overwrite_all = true;
                    plan.marked.push(file.clone());
                }
                OverwriteChoice::SkipAll => {
                    skip_all = true;
                    self.skip(&mut plan, rel_path);
                }
            }
        }
        Ok(plan)
    }

    fn skip(&self, plan: &mut CommitPlan, rel_path: String) {
        self.console.out(format!("  Skipped {}", rel_path));
        plan.skipped.push(rel_path);
    }
}
