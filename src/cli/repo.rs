// src/cli/repo.rs
//! Repository management commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum RepoCommands {
    /// Register a repository and mirror its templates
    Add {
        /// Repository name
        name: String,

        /// Catalog location: an http(s) URL, a file:// URL or a path to a
        /// `<name>-repository.json` file
        locator: String,
    },

    /// Unregister a repository and delete its mirrored files
    Remove {
        /// Repository name
        name: String,
    },

    /// List registered repositories
    List,

    /// Check whether a catalog location is usable without registering it
    Check {
        /// Repository name used in messages
        name: String,

        /// Catalog location to check
        url: String,
    },
}
