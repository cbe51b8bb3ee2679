// src/repository/mod.rs

//! Repository sources, mirroring and synchronization
//!
//! This module provides functionality for:
//! - Fetching catalogs and assets over HTTP(S) or from folders
//! - Mirroring repositories into the install root
//! - Refreshing mirrors when their catalog digest changes
//! - Installing template dependencies into the dependency directory

mod client;
mod dependencies;
mod plugin;
mod registry;
mod source;
mod sync;

pub use client::{ClientSettings, Location, RepositoryClient};
pub use dependencies::DependencyInstaller;
pub use plugin::{CentralRepository, SourceFactory, SourceRegistry};
pub use registry::{MirrorReport, RepositoryRegistry};
pub use source::{LocalFolder, RemoteFolder, RemoteUrl, RepositorySource, source_for_locator};
pub use sync::{RepositoryStatus, SyncEngine, UPDATE_FINISHED};
