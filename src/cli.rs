// src/cli.rs
//! CLI definitions for cellarman
//!
//! This module contains the command-line interface definitions using
//! clap. The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cellarman")]
#[command(author, version)]
#[command(about = "Homebrew operations client with live progress streaming", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install packages
    Install {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,

        /// Treat the names as casks instead of formulae
        #[arg(long)]
        cask: bool,
    },

    /// Uninstall packages
    Uninstall {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,

        /// Treat the names as casks instead of formulae
        #[arg(long)]
        cask: bool,
    },

    /// Upgrade outdated packages
    Upgrade {
        /// Formula names to upgrade (none with --all upgrades everything)
        formulae: Vec<String>,

        /// Cask names to upgrade (repeatable)
        #[arg(long = "cask", value_name = "NAME")]
        casks: Vec<String>,

        /// Upgrade everything outdated
        #[arg(long)]
        all: bool,

        /// Prompt for the administrator password up front and validate it
        #[arg(long)]
        ask_pass: bool,
    },

    /// Refresh the backend's package metadata
    Update,

    /// List installed packages
    Installed,

    /// List the full catalog: installed packages plus available upgrades
    Packages,

    /// Show a dashboard summary of the system
    Summary,

    /// List outdated packages
    Outdated,

    /// List deprecated or disabled installed packages
    Deprecated,

    /// List packages installed only as unused dependencies
    Orphaned,

    /// Search for packages
    Search {
        query: String,
    },

    /// Show details for one package
    Info {
        name: String,

        /// Look up a cask instead of a formula
        #[arg(long)]
        cask: bool,
    },

    /// Show the dependency tree for one package
    Deps {
        name: String,

        /// Look up a cask instead of a formula
        #[arg(long)]
        cask: bool,
    },

    /// Print installed package names for backup
    Backup,

    /// Check backend and package-manager health
    Health,
}
