//! Multikit CLI Binary
//!
//! Command-line interface for installing and managing Copilot agent kits.

use clap::Parser;
use multikit::logging::{init_logging, LoggingConfig};
use multikit::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env().with_overrides(&cli.log_overrides());
    if let Err(e) = init_logging(&logging) {
        eprintln!("Warning: {}", e);
    }

    let project_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("✗ Cannot determine current directory: {}", e);
            process::exit(1);
        }
    };

    let context = CliContext::new(project_dir);
    match context.execute(&cli.command) {
        Ok(status) => process::exit(status.exit_code()),
        Err(e) => {
            context.console().failure(e.to_string());
            process::exit(1);
        }
    }
}
