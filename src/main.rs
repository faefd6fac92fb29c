// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use cellarman::{BackendClient, BackendConfig, CredentialSession};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = BackendConfig::load()?;
    if let Some(url) = &cli.backend {
        config = config.with_base_url(url.as_str());
        config.validate()?;
    }
    let backend = BackendClient::new(config)?;
    let mut session = CredentialSession::new();

    match cli.command {
        Commands::Install { names, cask } => {
            commands::cmd_install(&backend, &mut session, &names, cask)
        }
        Commands::Uninstall { names, cask } => {
            commands::cmd_uninstall(&backend, &mut session, &names, cask)
        }
        Commands::Upgrade {
            formulae,
            casks,
            all,
            ask_pass,
        } => commands::cmd_upgrade(&backend, &mut session, &formulae, &casks, all, ask_pass),
        Commands::Update => commands::cmd_update(&backend, &mut session),
        Commands::Installed => commands::cmd_installed(&backend),
        Commands::Packages => commands::cmd_packages(&backend),
        Commands::Summary => commands::cmd_summary(&backend),
        Commands::Outdated => commands::cmd_outdated(&backend),
        Commands::Deprecated => commands::cmd_deprecated(&backend),
        Commands::Orphaned => commands::cmd_orphaned(&backend),
        Commands::Search { query } => commands::cmd_search(&backend, &query),
        Commands::Info { name, cask } => commands::cmd_info(&backend, &name, cask),
        Commands::Deps { name, cask } => commands::cmd_deps(&backend, &name, cask),
        Commands::Backup => commands::cmd_backup(&backend),
        Commands::Health => commands::cmd_health(&backend),
    }
}
