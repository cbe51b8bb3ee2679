// src/repository/source.rs

//! Repository sources
//!
//! A source makes one repository's catalog and assets fetchable. Built-in
//! variants:
//!
//! - `LocalFolder`: the always-present `local` repository inside the install root
//! - `RemoteFolder`: a catalog on a filesystem path outside the managed tree
//! - `RemoteUrl`: a catalog served over HTTP(S) with sibling asset files
//!
//! Host-provided implementations plug in through `SourceFactory` (see
//! `plugin.rs`).

use super::client::{Location, RepositoryClient};
use crate::error::{Error, Result};
use crate::paths::{self, LOCAL_REPOSITORY_NAME};
use crate::store::{LocalStore, write_atomic};
use crate::template::Catalog;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Capability interface shared by every repository source
pub trait RepositorySource: Send + Sync {
    /// Repository id this source serves
    fn name(&self) -> &str;

    /// Catalog locator as registered in the store
    fn locator(&self) -> &str;

    /// Short label for status lines and listings
    fn kind(&self) -> &str;

    /// Lifecycle hook run at the start of every refresh
    fn setup(&self, _store: &LocalStore) -> Result<()> {
        Ok(())
    }

    /// Raw catalog content from the authoritative location
    fn fetch_catalog(&self, client: &RepositoryClient) -> Result<Vec<u8>> {
        client.fetch_bytes(self.locator())
    }

    /// Fetch location of a file next to the catalog
    fn resolve_asset(&self, file_name: &str) -> String;

    /// Problems with using `locator` as this source's catalog
    fn check_url(&self, client: &RepositoryClient, locator: &str) -> Vec<String>;

    /// Catalog already held in memory by the source, if any
    ///
    /// When present, change detection digests this instead of the mirrored file.
    fn materialized_catalog(&self) -> Option<Catalog> {
        None
    }

    /// Whether refresh mirrors this repository into the install root
    fn is_mirrored(&self) -> bool {
        true
    }
}

/// Every locator must name a `.json` catalog
pub(crate) fn check_catalog_extension(name: &str, locator: &str) -> Vec<String> {
    let trimmed = locator.trim();
    let path = match Location::parse(trimmed) {
        Location::Remote(_) => &trimmed[..trimmed.find(['?', '#']).unwrap_or(trimmed.len())],
        Location::File(_) => trimmed,
    };
    if path.to_ascii_lowercase().ends_with(".json") {
        return Vec::new();
    }
    warn!(
        "Repository {} URL {} does not lead to a .json file",
        name, locator
    );
    vec![format!(
        "- There was an error on the repository {name}'s URL {locator}.\n   Error: URL should lead to .json file"
    )]
}

/// The built-in `local` repository
pub struct LocalFolder {
    catalog_path: PathBuf,
    locator: String,
}

impl LocalFolder {
    pub fn new(root: &Path) -> Self {
        let catalog_path = paths::local_catalog_file(root);
        let locator = catalog_path.to_string_lossy().into_owned();
        Self {
            catalog_path,
            locator,
        }
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }
}

impl RepositorySource for LocalFolder {
    fn name(&self) -> &str {
        LOCAL_REPOSITORY_NAME
    }

    fn locator(&self) -> &str {
        &self.locator
    }

    fn kind(&self) -> &str {
        "local"
    }

    /// Create an empty local catalog on first use
    fn setup(&self, store: &LocalStore) -> Result<()> {
        store.add_repository(LOCAL_REPOSITORY_NAME, &self.locator)?;
        if self.catalog_path.exists() {
            return Ok(());
        }
        write_atomic(&self.catalog_path, &Catalog::default().to_json_pretty()?)?;
        info!("Created local repository file {}", self.catalog_path.display());
        Ok(())
    }

    fn resolve_asset(&self, file_name: &str) -> String {
        folder_asset(&self.catalog_path, file_name)
    }

    fn check_url(&self, _client: &RepositoryClient, _locator: &str) -> Vec<String> {
        vec![format!(
            "- The {LOCAL_REPOSITORY_NAME} repository location cannot be changed."
        )]
    }

    fn is_mirrored(&self) -> bool {
        false
    }
}

/// A catalog on a filesystem path, optionally written as a `file://` URL
pub struct RemoteFolder {
    name: String,
    locator: String,
}

impl RemoteFolder {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }

    fn catalog_path(&self) -> PathBuf {
        match Location::parse(&self.locator) {
            Location::File(path) => path,
            Location::Remote(url) => PathBuf::from(url),
        }
    }
}

impl RepositorySource for RemoteFolder {
    fn name(&self) -> &str {
        &self.name
    }

    fn locator(&self) -> &str {
        &self.locator
    }

    fn kind(&self) -> &str {
        "folder"
    }

    fn fetch_catalog(&self, client: &RepositoryClient) -> Result<Vec<u8>> {
        let path = self.catalog_path();
        if !path.is_file() {
            return Err(Error::IoError(format!(
                "{} file does not exist",
                self.locator
            )));
        }
        client.fetch_bytes(&path.to_string_lossy())
    }

    fn resolve_asset(&self, file_name: &str) -> String {
        folder_asset(&self.catalog_path(), file_name)
    }

    fn check_url(&self, _client: &RepositoryClient, locator: &str) -> Vec<String> {
        let mut errors = check_catalog_extension(&self.name, locator);
        if !errors.is_empty() {
            return errors;
        }
        let exists = match Location::parse(locator) {
            Location::File(path) => path.is_file(),
            Location::Remote(_) => false,
        };
        if !exists {
            warn!(
                "Repository {} path {} does not exist",
                self.name, locator
            );
            errors.push(format!(
                "- We couldn't reach {}'s Path {}.\n   Error: File doesn't exist",
                self.name, locator
            ));
        }
        errors
    }
}

/// A catalog served over HTTP(S); assets are siblings of the catalog URL
pub struct RemoteUrl {
    name: String,
    locator: String,
}

impl RemoteUrl {
    pub fn new(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
        }
    }

    /// Catalog URL up to its last path `/`, without query or fragment
    fn base_url(&self) -> String {
        let locator = self.locator.trim();
        let path_end = locator.find(['?', '#']).unwrap_or(locator.len());
        match locator[..path_end].rfind('/') {
            Some(pos) => locator[..=pos].to_string(),
            None => locator[..path_end].to_string(),
        }
    }
}

impl RepositorySource for RemoteUrl {
    fn name(&self) -> &str {
        &self.name
    }

    fn locator(&self) -> &str {
        &self.locator
    }

    fn kind(&self) -> &str {
        "url"
    }

    /// Template ids and versions may contain spaces, so the file name is
    /// percent-encoded
    fn resolve_asset(&self, file_name: &str) -> String {
        let encoded = urlencoding::encode(file_name);
        match url::Url::parse(self.locator.trim()).and_then(|base| base.join(&encoded)) {
            Ok(url) => url.into(),
            Err(e) => {
                debug!("Cannot resolve {} against {}: {}", file_name, self.locator, e);
                format!("{}{}", self.base_url(), encoded)
            }
        }
    }

    fn check_url(&self, client: &RepositoryClient, locator: &str) -> Vec<String> {
        let mut errors = check_catalog_extension(&self.name, locator);
        if !errors.is_empty() {
            return errors;
        }

        let encoded = locator.trim().replace(' ', "%20");
        if let Err(e) = url::Url::parse(&encoded) {
            warn!("Repository {} URL {} does not parse: {}", self.name, locator, e);
            errors.push(format!(
                "- We couldn't parse {}'s url {}.\n   Error: {e}",
                self.name, locator
            ));
            return errors;
        }

        if !client.head_ok(&encoded) {
            warn!("Repository {} URL {} is not reachable", self.name, locator);
            errors.push(format!(
                "- We couldn't reach {}'s url {}.\n   Error: the server did not answer 200 OK",
                self.name, locator
            ));
        }
        errors
    }
}

/// Sibling of `catalog_path` named `file_name`
fn folder_asset(catalog_path: &Path, file_name: &str) -> String {
    catalog_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(file_name)
        .to_string_lossy()
        .into_owned()
}

/// Built-in source for a repository registered at `locator`
pub fn source_for_locator(name: &str, locator: &str) -> Box<dyn RepositorySource> {
    if Location::parse(locator).is_remote() {
        Box::new(RemoteUrl::new(name, locator))
    } else {
        Box::new(RemoteFolder::new(name, locator))
    }
}
