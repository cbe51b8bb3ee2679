// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, RepoCommands, TemplateCommands};
use commands::GlobalOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise -v raises the default level
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = GlobalOptions {
        config: cli.config,
        root: cli.root,
    };

    match cli.command {
        Commands::Refresh => commands::cmd_refresh(&options),
        Commands::Repo(command) => match command {
            RepoCommands::Add { name, locator } => commands::cmd_repo_add(&options, &name, &locator),
            RepoCommands::Remove { name } => commands::cmd_repo_remove(&options, &name),
            RepoCommands::List => commands::cmd_repo_list(&options),
            RepoCommands::Check { name, url } => commands::cmd_repo_check(&options, &name, &url),
        },
        Commands::Template(command) => match command {
            TemplateCommands::List { repository } => {
                commands::cmd_template_list(&options, &repository)
            }
            TemplateCommands::Info {
                repository,
                id,
                version,
            } => commands::cmd_template_info(&options, &repository, &id, &version),
            TemplateCommands::Install {
                repository,
                id,
                version,
                yes,
            } => commands::cmd_template_install(&options, &repository, &id, &version, yes),
            TemplateCommands::Uninstall {
                repository,
                id,
                version,
            } => commands::cmd_template_uninstall(&options, &repository, &id, &version),
        },
    }
}
