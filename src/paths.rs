// src/paths.rs
//! Centralized path derivation for the on-disk layout
//!
//! ```text
//! <root>/lib/<name>-<version>.<ext>                       dependency artifacts
//! <root>/templates/repositories.json                      local store config
//! <root>/templates/local-repository.json                  local catalog
//! <root>/templates/<id>-<version>-template.json           local templates
//! <root>/templates/<repo>/<repo>-repository.json          mirrored catalog
//! <root>/templates/<repo>/<id>-<version>-template.json    mirrored templates
//! ```

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Name of the always-present local repository
pub const LOCAL_REPOSITORY_NAME: &str = "local";

const TEMPLATES_DIR: &str = "templates";
const LIB_DIR: &str = "lib";
const CONFIG_FILE_NAME: &str = "repositories.json";
const REPOSITORY_FILE_SUFFIX: &str = "-repository.json";
const TEMPLATE_FILE_SUFFIX: &str = "-template.json";
const PROPERTIES_FILE_SUFFIX: &str = "-properties.json";
const SNAPSHOT_FILE_SUFFIX: &str = "-snapshot.png";

/// Directory holding every repository's templates
pub fn install_root(root: &Path) -> PathBuf {
    root.join(TEMPLATES_DIR)
}

/// Directory where dependency artifacts are written
pub fn lib_dir(root: &Path) -> PathBuf {
    root.join(LIB_DIR)
}

/// The local store configuration file
pub fn config_file(root: &Path) -> PathBuf {
    install_root(root).join(CONFIG_FILE_NAME)
}

/// True when `name` is exactly one normal path component
///
/// Names coming from catalogs, template files and repository ids end up in
/// `join`; anything else (`..`, `.`, separators, roots) could leave the
/// directory it is joined onto.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

/// Folder of a repository; the local repository lives at the install root
pub fn repository_dir(root: &Path, repository: &str) -> Result<PathBuf> {
    if repository == LOCAL_REPOSITORY_NAME {
        return Ok(install_root(root));
    }
    if !is_plain_file_name(repository) {
        return Err(Error::ConfigurationError(format!(
            "Repository id '{repository}' cannot be used as a folder name"
        )));
    }
    Ok(install_root(root).join(repository))
}

pub fn catalog_file_name(repository: &str) -> String {
    format!("{repository}{REPOSITORY_FILE_SUFFIX}")
}

/// Mirrored catalog of a repository
pub fn catalog_file(root: &Path, repository: &str) -> Result<PathBuf> {
    Ok(repository_dir(root, repository)?.join(catalog_file_name(repository)))
}

/// Catalog of the local repository
pub fn local_catalog_file(root: &Path) -> PathBuf {
    install_root(root).join(catalog_file_name(LOCAL_REPOSITORY_NAME))
}

pub fn template_file_name(id: &str, version: &str) -> String {
    format!("{id}-{version}{TEMPLATE_FILE_SUFFIX}")
}

pub fn properties_file_name(id: &str, version: &str) -> String {
    format!("{id}-{version}{PROPERTIES_FILE_SUFFIX}")
}

pub fn snapshot_file_name(id: &str, version: &str) -> String {
    format!("{id}-{version}{SNAPSHOT_FILE_SUFFIX}")
}

/// True for `<id>-<version>-template.json` file names
pub fn is_template_file(file_name: &str) -> bool {
    file_name.ends_with(TEMPLATE_FILE_SUFFIX)
}
