//! Logging System
//!
//! Structured logging through `tracing`. Diagnostics default to a log file so
//! they never interleave with the user-facing command output.
//!
//! Precedence, highest first: CLI flags, `MULTIKIT_LOG*` environment
//! variables, defaults.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "MULTIKIT_LOG";
const ENV_FORMAT: &str = "MULTIKIT_LOG_FORMAT";
const ENV_OUTPUT: &str = "MULTIKIT_LOG_OUTPUT";
const ENV_FILE: &str = "MULTIKIT_LOG_FILE";
const ENV_MODULES: &str = "MULTIKIT_LOG_MODULES";

const LOG_FILE_NAME: &str = "multikit.log";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Full filter directive; takes precedence over `level` and `modules`
    #[serde(default)]
    pub filter: Option<String>,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means the platform state dir
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, terminal destinations only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "file".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            filter: None,
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Logging flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct LogOverrides {
    pub verbose: bool,
    pub level: Option<String>,
    pub format: Option<String>,
    pub output: Option<String>,
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Defaults overlaid with `MULTIKIT_LOG*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(filter) = non_empty_env(ENV_FILTER) {
            config.filter = Some(filter);
        }
        if let Some(format) = non_empty_env(ENV_FORMAT) {
            config.format = format;
        }
        if let Some(output) = non_empty_env(ENV_OUTPUT) {
            config.output = output;
        }
        if let Some(file) = non_empty_env(ENV_FILE) {
            config.file = Some(PathBuf::from(file));
        }
        if let Some(modules) = non_empty_env(ENV_MODULES) {
            config.modules.extend(parse_module_levels(&modules));
        }
        config
    }

    /// Apply CLI flags on top. `--verbose` means debug on stderr unless
    /// level or output are given explicitly.
    pub fn with_overrides(mut self, overrides: &LogOverrides) -> Self {
        if overrides.verbose {
            self.level = "debug".to_string();
            self.filter = None;
            self.output = "stderr".to_string();
        }
        if let Some(level) = &overrides.level {
            self.level = level.clone();
            self.filter = None;
        }
        if let Some(format) = &overrides.format {
            self.format = format.clone();
        }
        if let Some(output) = &overrides.output {
            self.output = output.clone();
        }
        if let Some(file) = &overrides.file {
            self.file = Some(file.clone());
        }
        self
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `module=level,module=level`. Malformed entries are dropped.
fn parse_module_levels(spec: &str) -> HashMap<String, String> {
    spec.split(',')
        .filter_map(|entry| {
            let (module, level) = entry.split_once('=')?;
            let (module, level) = (module.trim(), level.trim());
            if module.is_empty() || level.is_empty() {
                None
            } else {
                Some((module.to_string(), level.to_string()))
            }
        })
        .collect()
}

/// Default log file: `<state dir>/multikit.log`, falling back to the local
/// data dir on platforms without a state dir.
pub fn default_log_file_path() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "multikit", "multikit").ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform directories for log file".to_string())
    })?;
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(dir.join(LOG_FILE_NAME))
}

/// Initialize the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let init_err = |e: tracing_subscriber::util::TryInitError| {
        ApiError::ConfigError(format!("Failed to initialize logging: {}", e))
    };

    if !config.enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(init_err);
    }

    let filter = build_env_filter(config)?;
    let output = parse_output_destinations(&config.output)?;
    let writer = make_writer(&output, config.file.as_deref())?;
    let use_ansi = config.color && !output.file;
    let subscriber = Registry::default().with(filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
            .map_err(init_err),
        "text" => subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_ansi)
                    .with_writer(writer),
            )
            .try_init()
            .map_err(init_err),
        other => Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

/// Build environment filter from the config
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Some(directive) = &config.filter {
        return EnvFilter::try_new(directive)
            .map_err(|e| ApiError::ConfigError(format!("Invalid {} directive: {}", ENV_FILTER, e)));
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| ApiError::ConfigError(format!("Invalid log level '{}': {}", config.level, e)))?;
    for (module, level) in &config.modules {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?,
        );
    }
    Ok(filter)
}

/// Output destinations
#[derive(Debug, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, ApiError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}

fn make_writer(output: &OutputDestinations, file: Option<&Path>) -> Result<BoxMakeWriter, ApiError> {
    if !output.file {
        return Ok(match (output.stdout, output.stderr) {
            (true, true) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
            (true, false) => BoxMakeWriter::new(std::io::stdout),
            _ => BoxMakeWriter::new(std::io::stderr),
        });
    }

    let path = match file {
        Some(p) => p.to_path_buf(),
        None => default_log_file_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ApiError::ConfigError(format!("Failed to create log directory: {}", e)))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| ApiError::ConfigError(format!("Failed to open log file {:?}: {}", path, e)))?;
    let log_file = Arc::new(log_file);

    Ok(if output.stderr {
        BoxMakeWriter::new(log_file.and(std::io::stderr))
    } else {
        BoxMakeWriter::new(log_file)
    })
}
