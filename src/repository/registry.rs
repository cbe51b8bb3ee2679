// src/repository/registry.rs

//! Repository registry: registration, mirroring and catalog queries
//!
//! Mirroring a repository copies its catalog and every referenced template
//! version into `<installRoot>/<name>/`. Files are only rewritten when their
//! content changed, and the catalog is written last so an interrupted pass
//! never leaves a catalog that lists files which were not fetched.

use super::client::RepositoryClient;
use super::plugin::SourceRegistry;
use super::source::{LocalFolder, RepositorySource, source_for_locator};
use crate::error::{Error, Result};
use crate::paths::{self, LOCAL_REPOSITORY_NAME};
use crate::store::{LocalStore, RepositoryRecord, TemplateAction, read_optional, write_atomic};
use crate::template::{
    Catalog, Template, TemplateBuilder, TemplateCatalogEntry, TemplateProperties, validation,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Files touched by one mirror pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub repository: String,
    pub templates: usize,
    pub written: usize,
    pub skipped_snapshots: usize,
    /// Catalog pairs whose id or version cannot be used as a file name
    pub rejected: usize,
}

pub struct RepositoryRegistry {
    store: Arc<LocalStore>,
    client: Arc<RepositoryClient>,
    sources: Arc<SourceRegistry>,
}

impl RepositoryRegistry {
    pub fn new(
        store: Arc<LocalStore>,
        client: Arc<RepositoryClient>,
        sources: Arc<SourceRegistry>,
    ) -> Self {
        Self {
            store,
            client,
            sources,
        }
    }

    pub fn store(&self) -> &Arc<LocalStore> {
        &self.store
    }

    pub fn client(&self) -> &Arc<RepositoryClient> {
        &self.client
    }

    pub fn sources(&self) -> &Arc<SourceRegistry> {
        &self.sources
    }

    fn root(&self) -> &Path {
        self.store.root()
    }

    /// Source for a registered repository
    ///
    /// Repositories created by a pluggable factory are rebuilt with it; the
    /// rest are classified by locator.
    pub fn source_for(&self, record: &RepositoryRecord) -> Box<dyn RepositorySource> {
        if record.is_local() {
            return Box::new(LocalFolder::new(self.root()));
        }
        if let Some(implementation) = self.store.managers().get(&record.name) {
            match self.sources.get(implementation) {
                Some(factory) => return factory.create(&record.name, &record.locator),
                None => warn!(
                    "Source implementation {} for {} is not available, using its locator",
                    implementation, record.name
                ),
            }
        }
        source_for_locator(&record.name, &record.locator)
    }

    /// Source for repository `name`; `ConfigurationError` when not registered
    pub fn source(&self, name: &str) -> Result<Box<dyn RepositorySource>> {
        let record = self.store.repository(name).ok_or_else(|| {
            Error::ConfigurationError(format!("Repository {name} is not registered"))
        })?;
        Ok(self.source_for(&record))
    }

    /// Register `name` at `locator` and mirror its content
    pub fn save(&self, name: &str, locator: &str) -> Result<MirrorReport> {
        if name == LOCAL_REPOSITORY_NAME {
            return Err(Error::ConfigurationError(format!(
                "The {LOCAL_REPOSITORY_NAME} repository cannot be replaced"
            )));
        }
        let record = RepositoryRecord::new(name, locator);
        let source = self.source_for(&record);
        self.mirror(source.as_ref())
    }

    /// Mirror `source` into the install root, registering it first
    ///
    /// When the catalog cannot be fetched or parsed, a registration made by
    /// this call is rolled back along with a folder it created.
    pub fn mirror(&self, source: &dyn RepositorySource) -> Result<MirrorReport> {
        let name = source.name();
        let dir = paths::repository_dir(self.root(), name)?;
        let created_dir = !dir.exists();

        let registered = self.store.add_repository(name, source.locator())?;

        let result = self.mirror_contents(source, &dir);
        if let Err(e) = &result {
            error!("Failed to mirror repository {}: {}", name, e);
            if registered {
                self.rollback(name, &dir, created_dir);
            }
        }
        result
    }

    fn rollback(&self, name: &str, dir: &Path, created_dir: bool) {
        if let Err(e) = self.store.remove_repository(name) {
            warn!("Failed to roll back registration of {}: {}", name, e);
        }
        if created_dir && dir.exists() {
            if let Err(e) = fs::remove_dir_all(dir) {
                warn!("Failed to remove {}: {}", dir.display(), e);
            }
        }
        info!("Rolled back registration of repository {}", name);
    }

    fn mirror_contents(&self, source: &dyn RepositorySource, dir: &Path) -> Result<MirrorReport> {
        let name = source.name();
        let content = source.fetch_catalog(&self.client)?;
        let catalog = Catalog::parse(&content)?;

        fs::create_dir_all(dir).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", dir.display()))
        })?;

        let mut report = MirrorReport {
            repository: name.to_string(),
            ..Default::default()
        };

        for (template_id, version) in catalog.pairs() {
            let template_name = paths::template_file_name(template_id, version);
            if !paths::is_plain_file_name(&template_name) {
                warn!(
                    "Skipping {} {} in {}: not usable as a file name",
                    template_id, version, name
                );
                report.rejected += 1;
                continue;
            }
            report.templates += 1;

            let template = self.client.fetch_bytes(&source.resolve_asset(&template_name))?;
            report.written += usize::from(write_if_changed(&dir.join(&template_name), &template)?);

            let snapshot_name = paths::snapshot_file_name(template_id, version);
            match self.client.fetch_optional(&source.resolve_asset(&snapshot_name)) {
                Ok(Some(snapshot)) => {
                    report.written +=
                        usize::from(write_if_changed(&dir.join(&snapshot_name), &snapshot)?);
                }
                Ok(None) => report.skipped_snapshots += 1,
                Err(e) => {
                    debug!("Skipping snapshot {}: {}", snapshot_name, e);
                    report.skipped_snapshots += 1;
                }
            }

            let properties_name = paths::properties_file_name(template_id, version);
            let properties_path = dir.join(&properties_name);
            let remote_properties = self
                .client
                .fetch_optional(&source.resolve_asset(&properties_name))
                .unwrap_or_else(|e| {
                    debug!("No remote properties {}: {}", properties_name, e);
                    None
                });
            let properties = match remote_properties {
                Some(bytes) => bytes,
                None if properties_path.exists() => continue,
                None => serde_json::to_vec_pretty(&TemplateProperties::default())?,
            };
            report.written += usize::from(write_if_changed(&properties_path, &properties)?);
        }

        let catalog_path = dir.join(paths::catalog_file_name(name));
        report.written += usize::from(write_if_changed(&catalog_path, &content)?);

        info!(
            "Mirrored repository {}: {} template versions, {} files written",
            name, report.templates, report.written
        );
        Ok(report)
    }

    /// Unregister a repository and delete its folder
    pub fn delete(&self, name: &str) -> Result<()> {
        if name == LOCAL_REPOSITORY_NAME {
            return Err(Error::ConfigurationError(format!(
                "The {LOCAL_REPOSITORY_NAME} repository cannot be deleted"
            )));
        }
        let dir = paths::repository_dir(self.root(), name)?;
        if !self.store.remove_repository(name)? {
            return Err(Error::ConfigurationError(format!(
                "Repository {name} is not registered"
            )));
        }

        match fs::remove_dir_all(&dir) {
            Ok(()) => info!("Deleted repository folder {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Repository folder {} was already absent", dir.display())
            }
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to delete {}: {e}",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    pub fn repositories(&self) -> Vec<RepositoryRecord> {
        self.store.repositories()
    }

    /// Mirrored catalog of `repository`; empty when nothing was mirrored yet
    ///
    /// The local catalog also lists template files saved in the install root.
    /// Pairs that cannot be used as file names are left out.
    pub fn catalog(&self, repository: &str) -> Result<Catalog> {
        if !self.store.contains(repository) {
            return Err(Error::ConfigurationError(format!(
                "Repository {repository} is not registered"
            )));
        }
        let mut catalog = match read_optional(&paths::catalog_file(self.root(), repository)?)? {
            Some(content) => Catalog::parse(&content)?,
            None => Catalog::default(),
        };
        if repository == LOCAL_REPOSITORY_NAME {
            for (template_id, version) in self.local_template_files() {
                catalog.add_version(&template_id, &version);
            }
        }
        let rejected = catalog.retain(|template_id, version| {
            paths::is_plain_file_name(&paths::template_file_name(template_id, version))
        });
        if rejected > 0 {
            warn!("Ignoring {} unusable catalog entries in {}", rejected, repository);
        }
        Ok(catalog)
    }

    /// `(id, version)` of every template file saved in the install root
    fn local_template_files(&self) -> Vec<(String, String)> {
        let dir = paths::install_root(self.root());
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !paths::is_template_file(file_name) || !path.is_file() {
                continue;
            }
            let template = match fs::read(&path)
                .map_err(Error::from)
                .and_then(|content| Ok(Template::from_json(&content)?))
            {
                Ok(template) => template,
                Err(e) => {
                    warn!("Skipping local template file {}: {}", path.display(), e);
                    continue;
                }
            };
            if paths::template_file_name(&template.id, &template.version) != file_name {
                warn!(
                    "Skipping {}: it declares {} {}",
                    path.display(),
                    template.id,
                    template.version
                );
                continue;
            }
            found.push((template.id, template.version));
        }
        found.sort();
        found
    }

    /// Catalog rows of one repository
    pub fn templates(&self, repository: &str) -> Result<Vec<TemplateCatalogEntry>> {
        Ok(self.catalog(repository)?.entries(repository))
    }

    /// Load one template version, injecting repository-derived fields
    pub fn find_by_id(&self, repository: &str, template_id: &str, version: &str) -> Result<Template> {
        let file_name = paths::template_file_name(template_id, version);
        if !paths::is_plain_file_name(&file_name) {
            return Err(Error::NotFoundError(format!(
                "Template {template_id} {version} cannot exist in {repository}"
            )));
        }
        let dir = paths::repository_dir(self.root(), repository)?;
        let path = dir.join(file_name);
        let content = read_optional(&path)?.ok_or_else(|| {
            Error::NotFoundError(format!(
                "Template {template_id} {version} not found in {repository}"
            ))
        })?;

        let mut template = Template::from_json(&content).map_err(|e| {
            Error::ParseError(format!("Invalid template file {}: {e}", path.display()))
        })?;
        template.repository_id = repository.to_string();
        template.installed = self
            .store
            .is_installed(repository, template_id, Some(version));

        let snapshot = dir.join(paths::snapshot_file_name(template_id, version));
        template.snapshot_path = snapshot.is_file().then_some(snapshot);
        template.properties = self.read_properties(&dir, template_id, version);
        Ok(template)
    }

    /// Every version of `template_id` across all repositories
    pub fn find(&self, template_id: &str) -> Result<Vec<Template>> {
        let mut found = Vec::new();
        for record in self.store.repositories() {
            let catalog = self.catalog(&record.name)?;
            for version in catalog.versions(template_id) {
                match self.find_by_id(&record.name, template_id, version) {
                    Ok(template) => found.push(template),
                    Err(e) => warn!("Skipping {} {} in {}: {}", template_id, version, record.name, e),
                }
            }
        }
        Ok(found)
    }

    /// Every template version listed by a repository's catalog
    pub fn load_templates(&self, repository: &str) -> Result<Vec<Template>> {
        let catalog = self.catalog(repository)?;
        let mut templates = Vec::new();
        for (template_id, version) in catalog.pairs() {
            match self.find_by_id(repository, template_id, version) {
                Ok(template) => templates.push(template),
                Err(e) => warn!("Skipping {} {} in {}: {}", template_id, version, repository, e),
            }
        }
        Ok(templates)
    }

    /// Template versions of a repository with their export/use flags
    pub fn templates_with_properties(
        &self,
        repository: &str,
    ) -> Result<Vec<(Template, TemplateProperties)>> {
        Ok(self
            .load_templates(repository)?
            .into_iter()
            .map(|template| {
                let properties = template.properties.clone();
                (template, properties)
            })
            .collect())
    }

    /// Every installed template version across repositories
    pub fn installed_templates(&self) -> Result<Vec<Template>> {
        let mut installed = Vec::new();
        for record in self.store.repositories() {
            for (template_id, version) in &record.installed_templates {
                match self.find_by_id(&record.name, template_id, version) {
                    Ok(template) => installed.push(template),
                    Err(e) => warn!(
                        "Installed template {} {} in {} cannot be loaded: {}",
                        template_id, version, record.name, e
                    ),
                }
            }
        }
        Ok(installed)
    }

    /// Add `version` of `template_id` to the local catalog
    pub fn update_local_repository(&self, template_id: &str, version: &str) -> Result<bool> {
        let path = paths::local_catalog_file(self.root());
        let mut catalog = match read_optional(&path)? {
            Some(content) => Catalog::parse(&content)?,
            None => Catalog::default(),
        };
        if !catalog.add_version(template_id, version) {
            debug!("{} {} already listed in the local catalog", template_id, version);
            return Ok(false);
        }
        write_atomic(&path, &catalog.to_json_pretty()?)?;
        info!("Added {} {} to the local catalog", template_id, version);
        Ok(true)
    }

    /// Whether a template file for `template_id` `version` exists locally,
    /// comparing file names case-insensitively
    pub fn is_local_template_version_saved(&self, template_id: &str, version: &str) -> bool {
        let expected = paths::template_file_name(template_id, version);
        let dir = paths::install_root(self.root());
        let Ok(entries) = fs::read_dir(&dir) else {
            return false;
        };
        entries.filter_map(|entry| entry.ok()).any(|entry| {
            entry.path().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .eq_ignore_ascii_case(&expected)
        })
    }

    /// Field-level problems with saving `builder` into the local repository
    pub fn validate_template(&self, builder: &TemplateBuilder) -> Result<Vec<String>> {
        let mut existing: Vec<String> = self
            .catalog(LOCAL_REPOSITORY_NAME)?
            .versions(builder.id())
            .to_vec();
        if self.is_local_template_version_saved(builder.id(), builder.version())
            && !existing.iter().any(|v| v == builder.version())
        {
            existing.push(builder.version().to_string());
        }
        Ok(validation::check_template(builder, &existing))
    }

    /// Validate and save a new template version into the local repository
    ///
    /// The saved version is added to the local catalog and installed.
    pub fn save_template(&self, builder: &TemplateBuilder) -> Result<Template> {
        let errors = self.validate_template(builder)?;
        if !errors.is_empty() {
            return Err(Error::ValidationError(errors));
        }

        let dir = paths::install_root(self.root());
        let mut template = builder.build(LOCAL_REPOSITORY_NAME);

        write_atomic(
            &dir.join(paths::template_file_name(&template.id, &template.version)),
            &template.to_json_pretty()?,
        )?;

        if let Some(png) = builder.snapshot_bytes() {
            let snapshot = dir.join(paths::snapshot_file_name(&template.id, &template.version));
            write_atomic(&snapshot, png)?;
            template.snapshot_path = Some(snapshot);
        }

        write_atomic(
            &dir.join(paths::properties_file_name(&template.id, &template.version)),
            &serde_json::to_vec_pretty(&template.properties)?,
        )?;

        self.update_local_repository(&template.id, &template.version)?;
        self.store.manage_template(
            TemplateAction::Install,
            LOCAL_REPOSITORY_NAME,
            &template.id,
            &template.version,
        )?;
        template.installed = true;

        info!("Saved template {}", template.display_name());
        Ok(template)
    }

    /// Problems with registering repository `id` at `url`
    pub fn check_repository_url(&self, id: &str, url: &str) -> Vec<String> {
        let source = match self.store.managers().get(id).and_then(|i| self.sources.get(i)) {
            Some(factory) => factory.create(id, url),
            None => source_for_locator(id, url),
        };
        source.check_url(&self.client, url)
    }

    fn read_properties(&self, dir: &Path, template_id: &str, version: &str) -> TemplateProperties {
        let path = dir.join(paths::properties_file_name(template_id, version));
        match read_optional(&path) {
            Ok(Some(content)) => serde_json::from_slice(&content).unwrap_or_else(|e| {
                warn!("Invalid properties file {}: {}", path.display(), e);
                TemplateProperties::default()
            }),
            Ok(None) => TemplateProperties::default(),
            Err(e) => {
                warn!("{}", e);
                TemplateProperties::default()
            }
        }
    }
}

/// Write `content` unless the file already holds exactly that
fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool> {
    if read_optional(path)?.as_deref() == Some(content) {
        return Ok(false);
    }
    write_atomic(path, content)?;
    debug!("Wrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Dependency;
    use tempfile::TempDir;

    fn registry(dir: &TempDir) -> RepositoryRegistry {
        let store = Arc::new(LocalStore::open(dir.path()).unwrap());
        RepositoryRegistry::new(
            store,
            Arc::new(RepositoryClient::new().unwrap()),
            Arc::new(SourceRegistry::new()),
        )
    }

    /// Folder repository with `first@{1.0,1.1}` and `second@1.0`
    fn write_folder_repository(dir: &Path) -> String {
        fs::create_dir_all(dir).unwrap();
        let catalog = dir.join("test-repository.json");
        fs::write(
            &catalog,
            r#"{"first":{"versions":["1.0","1.1"]},"second":{"versions":["1.0"]}}"#,
        )
        .unwrap();
        for (id, version) in [("first", "1.0"), ("first", "1.1"), ("second", "1.0")] {
            fs::write(
                dir.join(paths::template_file_name(id, version)),
                format!(r#"{{"id":"{id}","version":"{version}","dependencies":[]}}"#),
            )
            .unwrap();
        }
        fs::write(dir.join(paths::snapshot_file_name("first", "1.1")), b"png").unwrap();
        catalog.to_string_lossy().into_owned()
    }

    #[test]
    fn test_save_folder_repository() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let locator = write_folder_repository(&dir.path().join("share"));

        let report = registry.save("test", &locator).unwrap();
        assert_eq!(report.templates, 3);
        assert_eq!(report.skipped_snapshots, 2);

        let entries = registry.templates("test").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].template_id, "first");
        assert_eq!(entries[0].versions, vec!["1.0", "1.1"]);

        let template = registry.find_by_id("test", "first", "1.1").unwrap();
        assert_eq!(template.repository_id, "test");
        assert!(template.snapshot_path.is_some());
        assert!(template.properties.can_export());
        assert!(!template.installed);

        let again = registry.save("test", &locator).unwrap();
        assert_eq!(again.written, 0);
    }

    #[test]
    fn test_save_rolls_back_on_bad_catalog() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let catalog = dir.path().join("bad-repository.json");
        fs::write(&catalog, "<html>not json</html>").unwrap();

        let err = registry.save("bad", &catalog.to_string_lossy()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(!registry.store().contains("bad"));
        assert!(!paths::repository_dir(dir.path(), "bad").unwrap().exists());
    }

    #[test]
    fn test_delete_repository() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let locator = write_folder_repository(&dir.path().join("share"));
        registry.save("test", &locator).unwrap();

        registry.delete("test").unwrap();
        assert!(!registry.store().contains("test"));
        assert!(!paths::repository_dir(dir.path(), "test").unwrap().exists());
        assert!(registry.delete("test").is_err());
        assert!(registry.delete(LOCAL_REPOSITORY_NAME).is_err());
    }

    #[test]
    fn test_save_template_round_trip() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let builder = TemplateBuilder::new("wordpress", "1.0")
            .description("Blog")
            .author("someone")
            .snapshot(b"png".to_vec());

        let saved = registry.save_template(&builder).unwrap();
        let loaded = registry
            .find_by_id(LOCAL_REPOSITORY_NAME, "wordpress", "1.0")
            .unwrap();
        assert_eq!(saved, loaded);
        assert!(loaded.dependencies.is_empty());
        assert!(loaded.installed);
        assert!(registry.is_local_template_version_saved("WordPress", "1.0"));
        assert_eq!(
            registry
                .catalog(LOCAL_REPOSITORY_NAME)
                .unwrap()
                .versions("wordpress")
                .to_vec(),
            vec!["1.0".to_string()]
        );
    }

    #[test]
    fn test_save_template_rejects_duplicate_version() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let builder = TemplateBuilder::new("wordpress", "1.0");
        registry.save_template(&builder).unwrap();

        let err = registry
            .save_template(&builder.clone().dependencies(vec![Dependency::new("", "", "")]))
            .unwrap_err();
        assert_eq!(err.messages().len(), 4);
    }

    #[test]
    fn test_installed_templates() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        registry
            .save_template(&TemplateBuilder::new("wordpress", "1.0"))
            .unwrap();
        let installed = registry.installed_templates().unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].repository_id, LOCAL_REPOSITORY_NAME);
    }

    #[test]
    fn test_catalog_entries_cannot_leave_the_repository_folder() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let share = dir.path().join("share");
        fs::create_dir_all(&share).unwrap();
        let catalog = share.join("test-repository.json");
        fs::write(
            &catalog,
            r#"{"../../escape":{"versions":["1"]},"first":{"versions":["1.0","../x"]}}"#,
        )
        .unwrap();
        fs::write(
            share.join(paths::template_file_name("first", "1.0")),
            r#"{"id":"first","version":"1.0"}"#,
        )
        .unwrap();

        let report = registry.save("test", &catalog.to_string_lossy()).unwrap();
        assert_eq!(report.templates, 1);
        assert_eq!(report.rejected, 2);

        assert!(!dir.path().join("escape-1-properties.json").exists());
        assert!(!dir.path().join("templates/escape-1-properties.json").exists());
        assert!(!dir.path().join("templates/x-properties.json").exists());

        let entries = registry.templates("test").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].versions, vec!["1.0"]);
        assert!(matches!(
            registry.find_by_id("test", "../../escape", "1"),
            Err(Error::NotFoundError(_))
        ));
    }

    #[test]
    fn test_dot_repository_ids_are_refused() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let locator = write_folder_repository(&dir.path().join("share"));

        for name in ["..", ".", "a/.."] {
            let err = registry.save(name, &locator).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
            assert!(!registry.store().contains(name));
        }

        // A legacy registration under ".." must not take the root with it
        registry.store().add_repository("..", &locator).unwrap();
        assert!(registry.delete("..").is_err());
        assert!(registry.store().config_path().exists());
        assert!(registry.store().contains(".."));
    }

    #[test]
    fn test_local_catalog_lists_saved_template_files() {
        let dir = TempDir::new().unwrap();
        let registry = registry(&dir);
        let install_root = paths::install_root(dir.path());
        fs::write(
            install_root.join(paths::template_file_name("manual", "2.0")),
            r#"{"id":"manual","version":"2.0"}"#,
        )
        .unwrap();
        fs::write(
            install_root.join(paths::template_file_name("renamed", "1.0")),
            r#"{"id":"other","version":"1.0"}"#,
        )
        .unwrap();
        fs::write(install_root.join("broken-1.0-template.json"), "not json").unwrap();

        let catalog = registry.catalog(LOCAL_REPOSITORY_NAME).unwrap();
        assert_eq!(catalog.versions("manual").to_vec(), vec!["2.0".to_string()]);
        assert!(catalog.versions("renamed").is_empty());
        assert!(catalog.versions("other").is_empty());
        assert_eq!(catalog.len(), 1);

        let template = registry
            .find_by_id(LOCAL_REPOSITORY_NAME, "manual", "2.0")
            .unwrap();
        assert_eq!(template.repository_id, LOCAL_REPOSITORY_NAME);

        let err = registry
            .save_template(&TemplateBuilder::new("manual", "2.0"))
            .unwrap_err();
        assert_eq!(err.messages().len(), 1);
    }
}
