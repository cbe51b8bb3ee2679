// src/store/mod.rs

//! Local Store: registered repositories and their install state
//!
//! The store is the single source of truth for repository registration. Its
//! whole state is one JSON document at `<root>/templates/repositories.json`:
//!
//! ```json
//! {
//!   "repositories": [
//!     { "name": "local", "locator": "/opt/stencil/templates/local-repository.json",
//!       "installedTemplates": { "wordpress": "1.0" } }
//!   ],
//!   "managers": { "central": "central" }
//! }
//! ```
//!
//! Every mutation runs under one mutex: the current state is cloned, changed,
//! written to disk atomically, and only then becomes the in-memory state. A
//! failed write leaves both the file and memory untouched.

mod file;
mod install;

pub use file::{read_optional, write_atomic};
pub use install::{InstallState, InstallTransition, TemplateAction};

use crate::error::{Error, Result};
use crate::paths::{self, LOCAL_REPOSITORY_NAME};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// A registered repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub name: String,
    /// Catalog URL or filesystem path
    #[serde(alias = "url")]
    pub locator: String,
    /// Template id to installed version
    #[serde(default)]
    pub installed_templates: BTreeMap<String, String>,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            installed_templates: BTreeMap::new(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.name == LOCAL_REPOSITORY_NAME
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    repositories: Vec<RepositoryRecord>,
    /// Repository id to the pluggable source implementation that manages it
    #[serde(default)]
    managers: BTreeMap<String, String>,
}

impl StoreState {
    fn find(&self, name: &str) -> Option<&RepositoryRecord> {
        self.repositories.iter().find(|r| r.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut RepositoryRecord> {
        self.repositories.iter_mut().find(|r| r.name == name)
    }
}

pub struct LocalStore {
    root: PathBuf,
    config_path: PathBuf,
    state: Mutex<StoreState>,
}

impl LocalStore {
    /// Open the store under `root`, registering the local repository
    ///
    /// A config file that exists but cannot be parsed is an error; it is never
    /// silently replaced.
    pub fn open(root: &Path) -> Result<Self> {
        let install_root = paths::install_root(root);
        fs::create_dir_all(&install_root).map_err(|e| {
            Error::InitError(format!(
                "Failed to create install root {}: {e}",
                install_root.display()
            ))
        })?;

        let config_path = paths::config_file(root);
        let state = match read_optional(&config_path)? {
            Some(content) => serde_json::from_slice(&content).map_err(|e| {
                Error::ParseError(format!(
                    "Invalid store configuration {}: {e}",
                    config_path.display()
                ))
            })?,
            None => StoreState::default(),
        };

        debug!(
            "Opened local store at {} ({} repositories)",
            config_path.display(),
            state.repositories.len()
        );

        let store = Self {
            root: root.to_path_buf(),
            config_path,
            state: Mutex::new(state),
        };

        let local_catalog = paths::local_catalog_file(root);
        store.add_repository(LOCAL_REPOSITORY_NAME, &local_catalog.to_string_lossy())?;

        Ok(store)
    }

    /// Application root this store was opened under
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Register a repository; returns false when `name` was already registered
    pub fn add_repository(&self, name: &str, locator: &str) -> Result<bool> {
        self.update(|state| {
            if state.find(name).is_some() {
                return Ok((false, false));
            }
            state
                .repositories
                .push(RepositoryRecord::new(name, locator));
            Ok((true, true))
        })
        .inspect(|added| {
            if *added {
                info!("Registered repository {} at {}", name, locator);
            }
        })
    }

    /// Unregister a repository; files are left to the caller
    pub fn remove_repository(&self, name: &str) -> Result<bool> {
        self.update(|state| {
            let before = state.repositories.len();
            state.repositories.retain(|r| r.name != name);
            let removed = state.repositories.len() != before;
            let manager_removed = state.managers.remove(name).is_some();
            Ok((removed, removed || manager_removed))
        })
        .inspect(|removed| {
            if *removed {
                info!("Unregistered repository {}", name);
            }
        })
    }

    /// Snapshot of every registered repository, in registration order
    pub fn repositories(&self) -> Vec<RepositoryRecord> {
        self.lock().repositories.clone()
    }

    pub fn repository(&self, name: &str) -> Option<RepositoryRecord> {
        self.lock().find(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().find(name).is_some()
    }

    /// Locator of a repository, matching the name case-insensitively
    pub fn locator(&self, name: &str) -> Option<String> {
        self.lock()
            .repositories
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.locator.clone())
    }

    /// True when `template_id` is installed, at `version` if one is given
    pub fn is_installed(&self, repository: &str, template_id: &str, version: Option<&str>) -> bool {
        let state = self.lock();
        let Some(record) = state.find(repository) else {
            return false;
        };
        match (record.installed_templates.get(template_id), version) {
            (Some(installed), Some(version)) => installed == version,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn installed_version(&self, repository: &str, template_id: &str) -> Option<String> {
        self.lock()
            .find(repository)
            .and_then(|r| r.installed_templates.get(template_id).cloned())
    }

    /// The only mutator of install state
    pub fn manage_template(
        &self,
        action: TemplateAction,
        repository: &str,
        template_id: &str,
        version: &str,
    ) -> Result<InstallTransition> {
        let transition = self.update(|state| {
            let record = state.find_mut(repository).ok_or_else(|| {
                Error::ConfigurationError(format!(
                    "Cannot {action} {template_id} {version}: repository {repository} is not registered"
                ))
            })?;
            let transition = install::apply(
                &mut record.installed_templates,
                repository,
                action,
                template_id,
                version,
            );
            let changed = transition.changed();
            Ok((transition, changed))
        })?;

        if let Some(previous) = transition.replaced() {
            info!(
                "Replaced {} {} with {} in {}",
                template_id, previous, version, repository
            );
        } else if transition.changed() {
            info!("{} {} {} in {}", action, template_id, version, repository);
        } else {
            debug!(
                "{} {} {} in {}: already {}",
                action, template_id, version, repository, transition.to
            );
        }

        Ok(transition)
    }

    /// Remember which pluggable source implementation manages `repository`
    pub fn set_manager(&self, repository: &str, implementation: &str) -> Result<()> {
        self.update(|state| {
            let previous = state
                .managers
                .insert(repository.to_string(), implementation.to_string());
            let changed = previous.as_deref() != Some(implementation);
            Ok(((), changed))
        })
    }

    /// Repository id to implementation name for every pluggable source
    pub fn managers(&self) -> BTreeMap<String, String> {
        self.lock().managers.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // A poisoned lock still holds the last committed state
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run a read-modify-write cycle; `f` returns its value and whether
    /// the state changed
    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoreState) -> Result<(T, bool)>,
    {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let (value, changed) = f(&mut next)?;
        if changed {
            self.persist(&next)?;
            *guard = next;
        }
        Ok(value)
    }

    fn persist(&self, state: &StoreState) -> Result<()> {
        let content = serde_json::to_vec_pretty(state)?;

        // Cross-process guard; the mutex already serializes this process
        let lock_path = self.config_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                Error::IoError(format!("Failed to open lock {}: {e}", lock_path.display()))
            })?;
        lock_file.lock_exclusive().map_err(|e| {
            Error::IoError(format!("Failed to lock {}: {e}", lock_path.display()))
        })?;

        let result = write_atomic(&self.config_path, &content);

        if let Err(e) = FileExt::unlock(&lock_file) {
            warn!("Failed to release {}: {}", lock_path.display(), e);
        }
        result
    }
}
