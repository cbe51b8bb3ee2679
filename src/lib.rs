// src/lib.rs

//! Stencil template catalog manager
//!
//! Manages versioned templates (rule bundles with metadata and optional
//! binary dependencies) spread across a local store and any number of
//! remote repositories, and tracks which versions are installed.
//!
//! # Architecture
//!
//! - Local Store: one JSON config file, written atomically under a mutex
//! - Repository sources: local folder, remote folder, remote URL, pluggable
//! - Sync engine: content-digest change detection, per-repository failures skipped
//! - Dependency installer: conflict detection before any download
//! - Install state: at most one installed version per template id

pub mod config;
mod error;
pub mod hash;
pub mod manager;
pub mod paths;
pub mod progress;
pub mod repository;
pub mod store;
pub mod template;

pub use config::{CentralRepositoryConfig, EngineConfig};
pub use error::{Error, ErrorKind, Result};
pub use hash::{Hash, HashAlgorithm, Hasher};
pub use manager::{InstallOutcome, InstallReport, TemplateManager};
pub use progress::{
    CallbackProgress, LogProgress, ProgressEvent, ProgressTracker, SilentProgress,
};
pub use repository::{
    DependencyInstaller, RepositoryClient, RepositoryRegistry, RepositorySource, SourceFactory,
    SourceRegistry, SyncEngine,
};
pub use store::{InstallState, InstallTransition, LocalStore, RepositoryRecord, TemplateAction};
pub use template::{
    Catalog, Dependency, Template, TemplateBuilder, TemplateCatalogEntry, TemplateProperties,
};
