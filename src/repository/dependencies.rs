// src/repository/dependencies.rs

//! Dependency installation
//!
//! Makes a template's declared dependencies present in the dependency
//! directory. Install state is inferred from file names: an artifact for
//! dependency `name` at `version` is `<name>-<version>.<ext>`, and any other
//! file that looks like the same artifact is a conflict.
//!
//! Callers detect conflicts first, delete the ones the user confirmed, and
//! only then download, so a fresh download is never reported as a conflict.

use super::client::RepositoryClient;
use crate::error::{Error, Result};
use crate::hash::{self, HashAlgorithm};
use crate::paths;
use crate::template::Dependency;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct DependencyInstaller {
    lib_dir: PathBuf,
    client: Arc<RepositoryClient>,
}

impl DependencyInstaller {
    pub fn new(lib_dir: impl Into<PathBuf>, client: Arc<RepositoryClient>) -> Self {
        Self {
            lib_dir: lib_dir.into(),
            client,
        }
    }

    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    /// Existing files that would clash with the declared set
    ///
    /// A file is a candidate for a dependency when its name contains the
    /// dependency name (case-insensitive) or equals the stem of the source
    /// URL's file name, and it carries the same artifact extension. Files
    /// that are exactly some declared dependency's `<name>-<version>.<ext>`
    /// are never conflicts.
    pub fn find_conflicting_dependencies(&self, dependencies: &[Dependency]) -> Result<Vec<PathBuf>> {
        let files = self.artifact_files()?;
        let declared: BTreeSet<String> = dependencies
            .iter()
            .map(|d| d.file_name().to_lowercase())
            .collect();

        let mut conflicts = BTreeSet::new();
        for dependency in dependencies {
            let name = dependency.name.to_lowercase();
            let extension = dependency.artifact_extension().to_lowercase();
            let url_stem = url_file_stem(dependency).to_lowercase();

            for path in &files {
                let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase())
                else {
                    continue;
                };
                if declared.contains(&file_name) {
                    continue;
                }
                let Some((stem, ext)) = file_name.rsplit_once('.') else {
                    continue;
                };
                if ext != extension {
                    continue;
                }

                let by_name = !name.is_empty() && stem.contains(&name);
                let by_url = !url_stem.is_empty() && stem == url_stem;
                if by_name || by_url {
                    debug!(
                        "{} conflicts with dependency {} {}",
                        path.display(),
                        dependency.name,
                        dependency.version
                    );
                    conflicts.insert(path.clone());
                }
            }
        }

        Ok(conflicts.into_iter().collect())
    }

    /// Delete confirmed conflicts; failures are logged, never raised
    pub fn delete_conflicts(&self, files: &[PathBuf]) -> usize {
        let mut deleted = 0;
        for file in files {
            match fs::remove_file(file) {
                Ok(()) => {
                    info!("Deleted conflicting dependency {}", file.display());
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete conflicting dependency {}: {}", file.display(), e),
            }
        }
        deleted
    }

    /// Download every declared dependency not already present
    ///
    /// Returns the files written. The first failure aborts the batch.
    pub fn download_dependencies(&self, dependencies: &[Dependency]) -> Result<Vec<PathBuf>> {
        let mut downloaded = Vec::new();
        for dependency in dependencies {
            let file_name = dependency.file_name();
            if !paths::is_plain_file_name(&file_name) {
                return Err(Error::ConfigurationError(format!(
                    "Dependency {} {} cannot be installed as {file_name}",
                    dependency.name, dependency.version
                )));
            }
            let dest = self.lib_dir.join(file_name);
            if dest.exists() {
                debug!("Dependency {} already present, skipping", dest.display());
                continue;
            }

            self.client.download_file(&dependency.url, &dest).map_err(|e| {
                Error::DownloadError(format!(
                    "Failed to download dependency {} {} from {}: {e}",
                    dependency.name, dependency.version, dependency.url
                ))
            })?;

            if let Some(expected) = &dependency.sha256 {
                verify_artifact(&dest, expected)?;
            }
            downloaded.push(dest);
        }
        Ok(downloaded)
    }

    /// Pre-flight check used while authoring a template
    pub fn is_valid_dependency_url(&self, url: &str, name: &str, version: &str) -> bool {
        let valid = self.client.head_ok(url);
        if !valid {
            warn!("Dependency {} {} URL {} is not reachable", name, version, url);
        }
        valid
    }

    /// Messages for every dependency whose URL does not answer
    pub fn check_dependency_urls(&self, dependencies: &[Dependency]) -> Vec<String> {
        dependencies
            .iter()
            .filter(|d| !self.is_valid_dependency_url(&d.url, &d.name, &d.version))
            .map(|d| {
                format!(
                    "- Dependency {} {} cannot be reached at {}.",
                    d.name, d.version, d.url
                )
            })
            .collect()
    }

    fn artifact_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.lib_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to list {}: {e}",
                    self.lib_dir.display()
                )));
            }
        };
        Ok(entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect())
    }
}

/// File name of the source URL without its extension
fn url_file_stem(dependency: &Dependency) -> &str {
    let file_name = dependency.url_file_name();
    match file_name.rfind('.') {
        Some(pos) => &file_name[..pos],
        None => file_name,
    }
}

fn verify_artifact(path: &Path, expected: &str) -> Result<()> {
    let outcome = hash::verify_file(path, expected, HashAlgorithm::Sha256)
        .map_err(|e| Error::IoError(format!("Failed to hash {}: {e}", path.display())))?;
    if let Err(mismatch) = outcome {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
        return Err(Error::DownloadError(format!("{}: {mismatch}", path.display())));
    }
    debug!("Verified {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installer(dir: &TempDir) -> DependencyInstaller {
        DependencyInstaller::new(
            dir.path().join("lib"),
            Arc::new(RepositoryClient::new().unwrap()),
        )
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"old").unwrap();
    }

    #[test]
    fn test_missing_lib_dir_has_no_conflicts() {
        let dir = TempDir::new().unwrap();
        let deps = vec![Dependency::new("dummy", "1.0", "/srv/dummy.jar")];
        assert!(installer(&dir).find_conflicting_dependencies(&deps).unwrap().is_empty());
    }

    #[test]
    fn test_conflicts_resolve_to_declared_version() {
        let dir = TempDir::new().unwrap();
        let installer = installer(&dir);
        touch(&installer.lib_dir().join("dummy-2.0.jar"));
        touch(&installer.lib_dir().join("dummy-3.0.jar"));
        touch(&installer.lib_dir().join("unrelated-1.0.jar"));

        let source = dir.path().join("dist").join("dummy.jar");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"new").unwrap();
        let deps = vec![Dependency::new("dummy", "1.0", source.to_string_lossy())];

        let conflicts = installer.find_conflicting_dependencies(&deps).unwrap();
        assert_eq!(
            conflicts,
            vec![
                installer.lib_dir().join("dummy-2.0.jar"),
                installer.lib_dir().join("dummy-3.0.jar"),
            ]
        );

        assert_eq!(installer.delete_conflicts(&conflicts), 2);
        let downloaded = installer.download_dependencies(&deps).unwrap();
        assert_eq!(downloaded, vec![installer.lib_dir().join("dummy-1.0.jar")]);

        let mut remaining: Vec<_> = fs::read_dir(installer.lib_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec!["dummy-1.0.jar", "unrelated-1.0.jar"]);
        assert!(installer.find_conflicting_dependencies(&deps).unwrap().is_empty());
    }

    #[test]
    fn test_url_stem_match() {
        let dir = TempDir::new().unwrap();
        let installer = installer(&dir);
        touch(&installer.lib_dir().join("jmeter-plugin-core.jar"));
        let deps = vec![Dependency::new(
            "core",
            "2.1",
            "https://example.com/jmeter-plugin-core.jar",
        )];
        let conflicts = installer.find_conflicting_dependencies(&deps).unwrap();
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_existing_exact_file_is_not_downloaded() {
        let dir = TempDir::new().unwrap();
        let installer = installer(&dir);
        touch(&installer.lib_dir().join("dummy-1.0.jar"));
        let deps = vec![Dependency::new("dummy", "1.0", "/does/not/exist.jar")];
        assert!(installer.download_dependencies(&deps).unwrap().is_empty());
    }

    #[test]
    fn test_download_failure_is_io_class() {
        let dir = TempDir::new().unwrap();
        let deps = vec![Dependency::new("dummy", "1.0", "/does/not/exist.jar")];
        let err = installer(&dir).download_dependencies(&deps).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_sha256_mismatch_removes_artifact() {
        let dir = TempDir::new().unwrap();
        let installer = installer(&dir);
        let source = dir.path().join("dummy.jar");
        fs::write(&source, b"content").unwrap();
        let mut dep = Dependency::new("dummy", "1.0", source.to_string_lossy());
        dep.sha256 = Some("00".repeat(32));

        assert!(installer.download_dependencies(&[dep]).is_err());
        assert!(!installer.lib_dir().join("dummy-1.0.jar").exists());
    }

    #[test]
    fn test_dependency_names_cannot_leave_lib_dir() {
        let dir = TempDir::new().unwrap();
        let installer = installer(&dir);
        let source = dir.path().join("dist").join("outside.jar");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, b"payload").unwrap();

        for (name, version) in [("../../outside", "1"), ("outside", "../1"), ("/tmp/outside", "1")] {
            let deps = vec![Dependency::new(name, version, source.to_string_lossy())];
            let err = installer.download_dependencies(&deps).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        }
        assert!(!dir.path().join("outside-1.jar").exists());
        assert!(!dir.path().parent().unwrap().join("outside-1.jar").exists());
        assert!(!installer.lib_dir().exists());
    }
}
