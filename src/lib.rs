//! Multikit: Kit Manager for VS Code Copilot Agents
//!
//! Installs, updates, diffs and removes "kits" (named bundles of agent and
//! prompt markdown files) fetched from a static HTTPS registry into a
//! project's `.github/` tree, tracking what was installed in `multikit.toml`.

pub mod config;
pub mod console;
pub mod diff;
pub mod error;
pub mod installer;
pub mod kit;
pub mod logging;
pub mod remote;
pub mod tooling;
