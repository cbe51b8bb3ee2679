// src/manager.rs

//! Template manager facade
//!
//! Wires the Local Store, repository registry, sync engine and dependency
//! installer together and exposes the operations a CLI or GUI drives:
//! refresh, repository registration, catalog listing, install/uninstall and
//! saving new template versions.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::paths;
use crate::progress::ProgressTracker;
use crate::repository::{
    ClientSettings, DependencyInstaller, MirrorReport, RepositoryClient, RepositoryRegistry,
    SourceRegistry, SyncEngine,
};
use crate::store::{InstallTransition, LocalStore, RepositoryRecord, TemplateAction};
use crate::template::{
    Template, TemplateBuilder, TemplateCatalogEntry, TemplateProperties, validation,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::info;

/// What an install changed on disk and in the store
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub template: Template,
    pub transition: InstallTransition,
    pub deleted: Vec<PathBuf>,
    pub downloaded: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum InstallOutcome {
    Installed(InstallReport),
    /// The caller refused to delete these conflicting files; nothing changed
    Declined { conflicts: Vec<PathBuf> },
}

pub struct TemplateManager {
    config: EngineConfig,
    store: Arc<LocalStore>,
    registry: Arc<RepositoryRegistry>,
    engine: Arc<SyncEngine>,
    installer: DependencyInstaller,
}

impl TemplateManager {
    /// Open the manager with the built-in pluggable sources for `config`
    pub fn open(config: EngineConfig) -> Result<Self> {
        let sources = SourceRegistry::with_central(config.central.as_ref());
        Self::with_sources(config, sources)
    }

    /// Open the manager with an explicit set of pluggable sources
    pub fn with_sources(config: EngineConfig, sources: SourceRegistry) -> Result<Self> {
        let store = Arc::new(LocalStore::open(&config.root_dir)?);
        let client = Arc::new(RepositoryClient::with_settings(&ClientSettings::from(&config))?);
        let registry = Arc::new(RepositoryRegistry::new(
            Arc::clone(&store),
            Arc::clone(&client),
            Arc::new(sources),
        ));
        let engine = Arc::new(SyncEngine::new(Arc::clone(&registry)));
        let installer = DependencyInstaller::new(paths::lib_dir(&config.root_dir), client);

        info!("Template manager ready at {}", config.root_dir.display());
        Ok(Self {
            config,
            store,
            registry,
            engine,
            installer,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn installer(&self) -> &DependencyInstaller {
        &self.installer
    }

    /// Refresh every repository; true when nothing changed
    pub fn refresh(&self, progress: &dyn ProgressTracker) -> bool {
        self.engine.refresh(progress)
    }

    /// Refresh on a background worker thread
    pub fn spawn_refresh(&self, progress: Arc<dyn ProgressTracker>) -> JoinHandle<bool> {
        self.engine.spawn_refresh(progress)
    }

    pub fn list_repositories(&self) -> Vec<RepositoryRecord> {
        self.registry.repositories()
    }

    /// Validate, register and mirror a repository
    pub fn add_repository(&self, name: &str, locator: &str) -> Result<MirrorReport> {
        let existing = self.store.repositories();
        let mut errors = validation::check_new_repository(
            name,
            locator,
            existing
                .iter()
                .map(|r| (r.name.as_str(), r.locator.as_str())),
        );
        if errors.is_empty() {
            errors.extend(self.check_repository_url(name, locator));
        }
        if !errors.is_empty() {
            return Err(Error::ValidationError(errors));
        }
        self.registry.save(name, locator)
    }

    pub fn remove_repository(&self, name: &str) -> Result<()> {
        self.registry.delete(name)
    }

    pub fn check_repository_url(&self, id: &str, url: &str) -> Vec<String> {
        self.registry.check_repository_url(id, url)
    }

    pub fn list_templates(&self, repository: &str) -> Result<Vec<TemplateCatalogEntry>> {
        self.registry.templates(repository)
    }

    pub fn template(&self, repository: &str, template_id: &str, version: &str) -> Result<Template> {
        self.registry.find_by_id(repository, template_id, version)
    }

    pub fn templates_with_properties(
        &self,
        repository: &str,
    ) -> Result<Vec<(Template, TemplateProperties)>> {
        self.registry.templates_with_properties(repository)
    }

    pub fn installed_templates(&self) -> Result<Vec<Template>> {
        self.registry.installed_templates()
    }

    pub fn is_installed(&self, repository: &str, template_id: &str, version: &str) -> bool {
        self.store.is_installed(repository, template_id, Some(version))
    }

    /// Files a template's dependencies would clash with
    pub fn find_conflicts(
        &self,
        repository: &str,
        template_id: &str,
        version: &str,
    ) -> Result<Vec<PathBuf>> {
        let template = self.template(repository, template_id, version)?;
        self.installer
            .find_conflicting_dependencies(&template.dependencies)
    }

    /// Install a template version with its dependencies
    ///
    /// `confirm` is asked only when conflicting files exist. Conflicts are
    /// deleted before any download, and the install flag flips only after
    /// every dependency is in place.
    pub fn install<F>(
        &self,
        repository: &str,
        template_id: &str,
        version: &str,
        confirm: F,
    ) -> Result<InstallOutcome>
    where
        F: FnOnce(&[PathBuf]) -> bool,
    {
        let template = self.template(repository, template_id, version)?;

        let conflicts = self
            .installer
            .find_conflicting_dependencies(&template.dependencies)?;
        if !conflicts.is_empty() && !confirm(&conflicts) {
            info!(
                "Install of {} declined: {} conflicting files",
                template.display_name(),
                conflicts.len()
            );
            return Ok(InstallOutcome::Declined { conflicts });
        }

        self.installer.delete_conflicts(&conflicts);
        let downloaded = self
            .installer
            .download_dependencies(&template.dependencies)?;

        let transition =
            self.store
                .manage_template(TemplateAction::Install, repository, template_id, version)?;

        let mut template = template;
        template.installed = true;
        Ok(InstallOutcome::Installed(InstallReport {
            template,
            transition,
            deleted: conflicts,
            downloaded,
        }))
    }

    /// Mark a template version as no longer installed
    ///
    /// Dependency artifacts stay on disk; other templates may share them.
    pub fn uninstall(
        &self,
        repository: &str,
        template_id: &str,
        version: &str,
    ) -> Result<InstallTransition> {
        self.store
            .manage_template(TemplateAction::Uninstall, repository, template_id, version)
    }

    /// Validate and save a new local template version
    ///
    /// Field problems and unreachable dependency URLs are reported together.
    pub fn save_template(&self, builder: &TemplateBuilder) -> Result<Template> {
        let mut errors = self.registry.validate_template(builder)?;
        let reachable_candidates: Vec<_> = builder
            .dependency_list()
            .iter()
            .filter(|d| !d.url.trim().is_empty())
            .cloned()
            .collect();
        errors.extend(self.installer.check_dependency_urls(&reachable_candidates));
        if !errors.is_empty() {
            return Err(Error::ValidationError(errors));
        }
        self.registry.save_template(builder)
    }

    pub fn update_local_repository(&self, template_id: &str, version: &str) -> Result<bool> {
        self.registry.update_local_repository(template_id, version)
    }

    pub fn is_local_template_version_saved(&self, template_id: &str, version: &str) -> bool {
        self.registry
            .is_local_template_version_saved(template_id, version)
    }
}
