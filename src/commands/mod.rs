// src/commands/mod.rs
//! Command handlers for the stencil CLI

mod progress;
mod refresh;
mod repo;
mod template;

use anyhow::Result;
use std::path::PathBuf;
use stencil::{EngineConfig, TemplateManager};
use tracing::debug;

pub use refresh::cmd_refresh;
pub use repo::{cmd_repo_add, cmd_repo_check, cmd_repo_list, cmd_repo_remove};
pub use template::{cmd_template_info, cmd_template_install, cmd_template_list, cmd_template_uninstall};

/// Global options shared by every command
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

/// Load the engine configuration and open the manager
pub fn open_manager(options: &GlobalOptions) -> Result<TemplateManager> {
    let mut config = EngineConfig::load(options.config.as_deref())?;
    if let Some(root) = &options.root {
        config.root_dir = root.clone();
    }
    debug!("Using root {}", config.root_dir.display());
    Ok(TemplateManager::open(config)?)
}
