// src/commands/repo.rs
//! Repository management commands

use super::{GlobalOptions, open_manager};
use anyhow::Result;
use stencil::Error;
use tracing::info;

/// Register a repository and mirror it
pub fn cmd_repo_add(options: &GlobalOptions, name: &str, locator: &str) -> Result<()> {
    info!("Adding repository: {} ({})", name, locator);
    let manager = open_manager(options)?;

    match manager.add_repository(name, locator) {
        Ok(report) => {
            println!("Added repository: {}", name);
            println!("  Location: {}", locator);
            println!("  Template versions: {}", report.templates);
            if report.skipped_snapshots > 0 {
                println!("  Without snapshot: {}", report.skipped_snapshots);
            }
            Ok(())
        }
        Err(Error::ValidationError(messages)) => {
            eprintln!("Cannot add repository {}:", name);
            for message in &messages {
                eprintln!("{message}");
            }
            Err(anyhow::anyhow!("{} problem(s) found", messages.len()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unregister a repository
pub fn cmd_repo_remove(options: &GlobalOptions, name: &str) -> Result<()> {
    info!("Removing repository: {}", name);
    let manager = open_manager(options)?;
    manager.remove_repository(name)?;
    println!("Removed repository: {}", name);
    Ok(())
}

/// List registered repositories
pub fn cmd_repo_list(options: &GlobalOptions) -> Result<()> {
    let manager = open_manager(options)?;
    let repositories = manager.list_repositories();

    println!("Repositories:");
    for repo in repositories {
        let source = manager.registry().source_for(&repo);
        println!(
            "  {} [{}] ({} installed)",
            repo.name,
            source.kind(),
            repo.installed_templates.len()
        );
        println!("      {}", repo.locator);
    }
    Ok(())
}

/// Check a catalog location without registering it
pub fn cmd_repo_check(options: &GlobalOptions, name: &str, url: &str) -> Result<()> {
    let manager = open_manager(options)?;
    let errors = manager.check_repository_url(name, url);
    if errors.is_empty() {
        println!("{} is a valid location for {}", url, name);
        return Ok(());
    }
    for error in &errors {
        eprintln!("{error}");
    }
    Err(anyhow::anyhow!("{} problem(s) found", errors.len()))
}
