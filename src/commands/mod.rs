// src/commands/mod.rs
//! Command handlers for the cellarman CLI

mod ops;
mod query;

pub use ops::{cmd_install, cmd_uninstall, cmd_update, cmd_upgrade, TerminalPrompt};
pub use query::{
    cmd_backup, cmd_deprecated, cmd_deps, cmd_health, cmd_info, cmd_installed, cmd_orphaned,
    cmd_outdated, cmd_packages, cmd_search, cmd_summary,
};
