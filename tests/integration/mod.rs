//! End-to-end command flows driven through `CliContext`

mod diff_flow;
mod install_flow;
mod parse_cli;
mod project_flow;
mod support;
mod uninstall_flow;
