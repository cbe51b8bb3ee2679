// src/cli/mod.rs
//! CLI definitions for stencil
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `refresh` - Bring every repository mirror up to date
//! - `repo` - Repository registration and listing
//! - `template` - Template listing, inspection, install and uninstall

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod repo;
mod template;

pub use repo::RepoCommands;
pub use template::TemplateCommands;

#[derive(Parser)]
#[command(name = "stencil")]
#[command(version)]
#[command(about = "Template catalog manager with repository synchronization", long_about = None)]
pub struct Cli {
    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Application root directory (overrides the configuration and STENCIL_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh every registered repository
    Refresh,

    /// Repository management
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Template management
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stencil", "template", "install", "test", "first", "1.1", "--yes", "--root", "/tmp/x",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Template(TemplateCommands::Install { yes: true, .. })
        ));
    }
}
