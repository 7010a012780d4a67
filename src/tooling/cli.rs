//! CLI Tooling
//!
//! Command-line interface for managing Copilot agent kits in a project.
//! Argument parsing lives here; each command's behavior lives in
//! [`crate::tooling::commands`].

use crate::console::Console;
use crate::error::ApiError;
use crate::installer::{ConflictResolver, InteractiveResolver};
use crate::logging::LogOverrides;
use crate::remote::HttpTransport;
use crate::tooling::commands::install::InstallOptions;
use crate::tooling::commands::{self, CommandEnv, CommandStatus};
use crate::tooling::select::{InteractiveSelector, KitSelector};
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// multikit - Kit manager for VS Code Copilot agents
#[derive(Parser)]
#[command(name = "multikit", version)]
#[command(about = "Kit manager for VS Code Copilot agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging to stderr
    #[arg(long, short, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_overrides(&self) -> LogOverrides {
        LogOverrides {
            verbose: self.verbose,
            level: self.log_level.clone(),
            format: self.log_format.clone(),
            output: self.log_output.clone(),
            file: self.log_file.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize a new multikit project
    Init {
        /// Target project directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Install kits from the registry
    Install {
        /// Kit to install (interactive if omitted)
        kit: Option<String>,
        /// Overwrite existing files without prompting
        #[arg(long)]
        force: bool,
        /// Custom registry base URL
        #[arg(long)]
        registry: Option<String>,
    },
    /// Update installed kits to the latest remote version
    Update {
        /// Installed kit to update (interactive if omitted)
        kit: Option<String>,
        /// Overwrite existing files without prompting
        #[arg(long)]
        force: bool,
        /// Custom registry base URL
        #[arg(long)]
        registry: Option<String>,
    },
    /// Remove an installed kit
    Uninstall {
        /// Kit to uninstall (interactive if omitted)
        kit: Option<String>,
    },
    /// List available and installed kits
    List,
    /// Show differences between local and remote kit files
    Diff {
        /// Kit to diff (interactive if omitted)
        kit: Option<String>,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Install { .. } => "install",
            Commands::Update { .. } => "update",
            Commands::Uninstall { .. } => "uninstall",
            Commands::List => "list",
            Commands::Diff { .. } => "diff",
        }
    }
}

/// CLI context: the project being managed plus the collaborators commands use
pub struct CliContext {
    project_dir: PathBuf,
    console: Console,
    /// Shared transport override; `None` builds a reqwest transport per command
    transport: Option<Arc<dyn HttpTransport>>,
    resolver: Mutex<Box<dyn ConflictResolver>>,
    selector: Mutex<Box<dyn KitSelector>>,
}

impl CliContext {
    /// Context on the process streams with interactive prompts
    pub fn new(project_dir: PathBuf) -> Self {
        Self {
            project_dir,
            console: Console::stdio(),
            transport: None,
            resolver: Mutex::new(Box::new(InteractiveResolver)),
            selector: Mutex::new(Box::new(InteractiveSelector)),
        }
    }

    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.resolver = Mutex::new(Box::new(resolver));
        self
    }

    pub fn with_selector(mut self, selector: impl KitSelector + 'static) -> Self {
        self.selector = Mutex::new(Box::new(selector));
        self
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<CommandStatus, ApiError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ApiError::ConfigError(
                "Cannot run a command from within an async runtime context".to_string(),
            ));
        }
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        info!(command = command.name(), project = %self.project_dir.display(), "Running command");
        let mut resolver = self.resolver.lock();
        let mut selector = self.selector.lock();
        let mut env = CommandEnv {
            project_dir: &self.project_dir,
            console: &self.console,
            transport: self.transport.clone(),
            resolver: &mut **resolver,
            selector: &mut **selector,
        };

        let status = rt.block_on(async {
            match command {
                Commands::Init { path } => commands::init::init(&env, path),
                Commands::Install {
                    kit,
                    force,
                    registry,
                } => {
                    let opts = InstallOptions {
                        kit: kit.as_deref(),
                        force: *force,
                        registry: registry.as_deref(),
                    };
                    commands::install::install(&mut env, opts).await
                }
                Commands::Update {
                    kit,
                    force,
                    registry,
                } => {
                    let opts = InstallOptions {
                        kit: kit.as_deref(),
                        force: *force,
                        registry: registry.as_deref(),
                    };
                    commands::install::update(&mut env, opts).await
                }
                Commands::Uninstall { kit } => commands::uninstall::uninstall(&mut env, kit.as_deref()),
                Commands::List => commands::list::list(&env).await,
                Commands::Diff { kit } => commands::diff::diff(&mut env, kit.as_deref()).await,
            }
        })?;

        debug!(command = command.name(), exit_code = status.exit_code(), "Command finished");
        Ok(status)
    }
}
