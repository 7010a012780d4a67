//! Tooling & Integration Layer
//!
//! The command-line surface: argument parsing, per-command orchestration and
//! the interactive prompts commands fall back to when no kit is named.

pub mod cli;
pub mod commands;
pub mod select;

pub use cli::{Cli, CliContext, Commands};
pub use commands::CommandStatus;
pub use select::{InteractiveSelector, KitChoice, KitSelector};
