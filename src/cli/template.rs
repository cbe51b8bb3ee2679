// src/cli/template.rs
//! Template commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List the templates a repository offers
    List {
        /// Repository name
        repository: String,
    },

    /// Show one template version
    Info {
        repository: String,
        id: String,
        version: String,
    },

    /// Install a template version and its dependencies
    Install {
        repository: String,
        id: String,
        version: String,

        /// Delete conflicting dependency files without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Uninstall a template version
    Uninstall {
        repository: String,
        id: String,
        version: String,
    },
}
