// src/commands/refresh.rs
//! Refresh command

use super::progress::RefreshProgress;
use super::{GlobalOptions, open_manager};
use anyhow::Result;
use tracing::info;

/// Refresh every registered repository
pub fn cmd_refresh(options: &GlobalOptions) -> Result<()> {
    info!("Refreshing repositories");
    let manager = open_manager(options)?;

    let progress = RefreshProgress::new();
    if manager.refresh(&progress) {
        println!("All repositories are up to date");
    } else {
        println!("Repositories updated");
    }
    Ok(())
}
