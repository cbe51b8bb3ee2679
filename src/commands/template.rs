// src/commands/template.rs
//! Template commands

use super::{GlobalOptions, open_manager};
use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stencil::InstallOutcome;
use stencil::template::version::latest_version;
use tracing::info;

/// List the templates a repository offers
pub fn cmd_template_list(options: &GlobalOptions, repository: &str) -> Result<()> {
    let manager = open_manager(options)?;
    let entries = manager.list_templates(repository)?;

    if entries.is_empty() {
        println!("No templates in {}", repository);
        return Ok(());
    }

    println!("Templates in {}:", repository);
    for entry in entries {
        let installed = manager
            .store()
            .installed_version(repository, &entry.template_id);
        let mark = installed
            .as_deref()
            .map(|v| format!(" (installed {v})"))
            .unwrap_or_default();
        println!(
            "  {} [{}] latest {}{}",
            entry.template_id,
            entry.versions.join(", "),
            latest_version(&entry.versions),
            mark
        );
    }
    Ok(())
}

/// Show one template version
pub fn cmd_template_info(
    options: &GlobalOptions,
    repository: &str,
    id: &str,
    version: &str,
) -> Result<()> {
    let manager = open_manager(options)?;
    let template = manager.template(repository, id, version)?;

    println!("Template: {}", template.display_name());
    println!("  Author: {}", template.author);
    println!("  Description: {}", template.description);
    if !template.changes.is_empty() {
        println!("  Changes: {}", template.changes);
    }
    if !template.url.is_empty() {
        println!("  URL: {}", template.url);
    }
    println!("  Installed: {}", if template.installed { "yes" } else { "no" });
    println!(
        "  Export allowed: {}, use allowed: {}",
        template.properties.can_export(),
        template.properties.can_use()
    );
    if let Some(snapshot) = &template.snapshot_path {
        println!("  Snapshot: {}", snapshot.display());
    }
    if template.dependencies.is_empty() {
        println!("  Dependencies: none");
    } else {
        println!("  Dependencies:");
        for dependency in &template.dependencies {
            println!(
                "    {} {} ({})",
                dependency.name, dependency.version, dependency.url
            );
        }
    }
    Ok(())
}

/// Install a template version and its dependencies
pub fn cmd_template_install(
    options: &GlobalOptions,
    repository: &str,
    id: &str,
    version: &str,
    yes: bool,
) -> Result<()> {
    info!("Installing template {} {} from {}", id, version, repository);
    let manager = open_manager(options)?;

    let outcome = manager.install(repository, id, version, |conflicts| {
        yes || confirm_conflicts(conflicts)
    })?;

    match outcome {
        InstallOutcome::Installed(report) => {
            if let Some(previous) = report.transition.replaced() {
                println!("Replaced {} {} with {}", id, previous, version);
            }
            for file in &report.deleted {
                println!("  Deleted {}", file.display());
            }
            for file in &report.downloaded {
                println!("  Downloaded {}", file.display());
            }
            println!("Installed {}", report.template.display_name());
        }
        InstallOutcome::Declined { conflicts } => {
            println!(
                "Install cancelled; {} conflicting file(s) left in place",
                conflicts.len()
            );
        }
    }
    Ok(())
}

/// Uninstall a template version
pub fn cmd_template_uninstall(
    options: &GlobalOptions,
    repository: &str,
    id: &str,
    version: &str,
) -> Result<()> {
    info!("Uninstalling template {} {} from {}", id, version, repository);
    let manager = open_manager(options)?;
    let transition = manager.uninstall(repository, id, version)?;
    if transition.changed() {
        println!("Uninstalled {} {} from {}", id, version, repository);
    } else {
        println!("{} {} is not installed in {} ({})", id, version, repository, transition.from);
    }
    Ok(())
}

fn confirm_conflicts(conflicts: &[PathBuf]) -> bool {
    println!("These files conflict with the template's dependencies:");
    for file in conflicts {
        println!("  {}", file.display());
    }
    print!("Delete them and continue? [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
