// src/repository/sync.rs

//! Repository synchronization
//!
//! A refresh pass runs in two phases:
//!
//! 1. Setup: the local repository and every auto-loaded pluggable source run
//!    their `setup` hook, registering themselves when needed.
//! 2. Check: every registered remote repository has its catalog digested and
//!    compared with the mirrored copy; only changed repositories are mirrored
//!    again.
//!
//! Progress advances one step per source set up and one per repository, over
//! `sources + repositories` steps counted after setup. Failures for one
//! repository are logged and the pass moves on.

use super::registry::RepositoryRegistry;
use super::source::{LocalFolder, RepositorySource};
use crate::hash::{self, Hash};
use crate::paths;
use crate::progress::ProgressTracker;
use crate::error::Result;
use crate::store::{RepositoryRecord, read_optional};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Final status line of a refresh pass
pub const UPDATE_FINISHED: &str = "Update finished";

/// Outcome of checking one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryStatus {
    UpToDate,
    Updated,
    Failed(String),
}

pub struct SyncEngine {
    registry: Arc<RepositoryRegistry>,
}

impl SyncEngine {
    pub fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RepositoryRegistry> {
        &self.registry
    }

    /// Run one refresh pass; true when every remote repository was current
    pub fn refresh(&self, progress: &dyn ProgressTracker) -> bool {
        let store = self.registry.store();
        let sources = self.setup_sources();
        progress.set_length((sources.len() + store.repositories().len()) as u64);

        for source in &sources {
            progress.set_message(&format!("Setting up {}", source.name()));
            if let Err(e) = source.setup(store) {
                error!("Setup of repository {} failed: {}", source.name(), e);
            }
            progress.increment(1);
        }

        let repositories = store.repositories();
        let total = (sources.len() + repositories.len()) as u64;
        progress.set_length(total);

        let mut up_to_date = true;
        for record in &repositories {
            if record.is_local() {
                progress.increment(1);
                continue;
            }
            match self.refresh_repository(record, progress) {
                RepositoryStatus::UpToDate => {
                    debug!("Repository {} is up to date", record.name);
                }
                RepositoryStatus::Updated => up_to_date = false,
                RepositoryStatus::Failed(message) => {
                    warn!("Skipping repository {}: {}", record.name, message);
                }
            }
            progress.increment(1);
        }

        progress.finish_with_message(UPDATE_FINISHED);
        info!(
            "Refresh finished: {}",
            if up_to_date { "all repositories up to date" } else { "repositories updated" }
        );
        up_to_date
    }

    /// Run a refresh pass on one background worker thread
    pub fn spawn_refresh(
        self: &Arc<Self>,
        progress: Arc<dyn ProgressTracker>,
    ) -> JoinHandle<bool> {
        let engine = Arc::clone(self);
        std::thread::spawn(move || engine.refresh(progress.as_ref()))
    }

    /// Check one repository, mirroring it again when its catalog changed
    pub fn refresh_repository(
        &self,
        record: &RepositoryRecord,
        progress: &dyn ProgressTracker,
    ) -> RepositoryStatus {
        let source = self.registry.source_for(record);
        if !source.is_mirrored() {
            return RepositoryStatus::UpToDate;
        }

        progress.set_message(&format!("Checking {}", record.name));
        let remote = match source.fetch_catalog(self.registry.client()) {
            Ok(content) => hash::catalog_digest(&content),
            Err(e) => return RepositoryStatus::Failed(e.to_string()),
        };

        match self.local_digest(record, source.as_ref()) {
            Ok(Some(local)) if local == remote => return RepositoryStatus::UpToDate,
            Ok(_) => {}
            Err(e) => debug!("Local catalog of {} unreadable: {}", record.name, e),
        }

        progress.set_message(&format!("Updating {}", record.name));
        match self.registry.mirror(source.as_ref()) {
            Ok(report) => {
                info!(
                    "Updated repository {} ({} files written)",
                    record.name, report.written
                );
                RepositoryStatus::Updated
            }
            Err(e) => RepositoryStatus::Failed(e.to_string()),
        }
    }

    /// Digest of what is held locally for a repository
    fn local_digest(
        &self,
        record: &RepositoryRecord,
        source: &dyn RepositorySource,
    ) -> Result<Option<Hash>> {
        if let Some(catalog) = source.materialized_catalog() {
            return Ok(Some(hash::catalog_digest(&catalog.to_json_pretty()?)));
        }
        let path = paths::catalog_file(self.registry.store().root(), &record.name)?;
        Ok(read_optional(&path)?.map(|content| hash::catalog_digest(&content)))
    }

    /// Local repository plus auto-loaded pluggable sources
    ///
    /// Auto-loaded sources are registered and bound to their factory here, so
    /// the check phase treats them like any other repository.
    fn setup_sources(&self) -> Vec<Box<dyn RepositorySource>> {
        let store = self.registry.store();
        let mut sources: Vec<Box<dyn RepositorySource>> =
            vec![Box::new(LocalFolder::new(store.root()))];

        for factory in self.registry.sources().auto_loaded() {
            let Some((name, locator)) = factory.default_registration() else {
                continue;
            };
            let bound = store
                .add_repository(&name, &locator)
                .and_then(|_| store.set_manager(&name, factory.implementation()));
            if let Err(e) = bound {
                error!("Failed to register repository {}: {}", name, e);
                continue;
            }
            let locator = store.locator(&name).unwrap_or(locator);
            sources.push(factory.create(&name, &locator));
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{CallbackProgress, ProgressEvent};
    use crate::repository::{RepositoryClient, SourceRegistry};
    use crate::store::LocalStore;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> SyncEngine {
        let store = Arc::new(LocalStore::open(dir.path()).unwrap());
        let registry = RepositoryRegistry::new(
            store,
            Arc::new(RepositoryClient::new().unwrap()),
            Arc::new(SourceRegistry::new()),
        );
        SyncEngine::new(Arc::new(registry))
    }

    #[test]
    fn test_refresh_with_only_local_repository() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let progress = CallbackProgress::new(move |event| sink.lock().unwrap().push(event));

        assert!(engine.refresh(&progress));

        let events = events.lock().unwrap();
        assert_eq!(events.first(), Some(&ProgressEvent::Message("Setting up local".into())));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished(UPDATE_FINISHED.into()))
        );
        assert!(events.contains(&ProgressEvent::Percent(100)));
        assert!(paths::local_catalog_file(dir.path()).exists());
    }

    #[test]
    fn test_refresh_detects_folder_changes() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let share = dir.path().join("share");
        fs::create_dir_all(&share).unwrap();
        let catalog = share.join("team-repository.json");
        fs::write(&catalog, r#"{"first":{"versions":["1.0"]}}"#).unwrap();
        fs::write(
            share.join("first-1.0-template.json"),
            r#"{"id":"first","version":"1.0"}"#,
        )
        .unwrap();
        engine
            .registry()
            .store()
            .add_repository("team", &catalog.to_string_lossy())
            .unwrap();

        let progress = crate::progress::SilentProgress::new();
        assert!(!engine.refresh(&progress));
        assert!(engine.refresh(&progress));

        // Reformatted but equivalent JSON is not a change
        fs::write(&catalog, "{\n  \"first\": { \"versions\": [\"1.0\"] }\n}").unwrap();
        assert!(engine.refresh(&progress));
    }

    #[test]
    fn test_unreachable_repository_is_skipped() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        engine
            .registry()
            .store()
            .add_repository("gone", "/nowhere/gone-repository.json")
            .unwrap();

        let progress = crate::progress::SilentProgress::new();
        assert!(engine.refresh(&progress));
        assert!(engine.registry().store().contains("gone"));
        assert_eq!(progress.position(), progress.length());
    }
}
