// src/template/model.rs

//! Template version, dependency and properties records
//!
//! These mirror the JSON files stored per template version. Rule content
//! (`groups`, legacy `rules`) is carried as opaque JSON.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const PROPERTY_NOT_ALLOW_EXPORT: &str = "not_allow_export";
pub const PROPERTY_DISALLOW_TO_USE: &str = "disallow_to_use";

const DEFAULT_ARTIFACT_EXTENSION: &str = "jar";

/// Accept `null` wherever a defaulted value is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A specific version of a template
///
/// Identity is `(repository_id, id, version)`. `repository_id` is never
/// written to disk; the loader injects it from the containing repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_filters: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<Value>,
    /// Pre-group rule lists; folded into `groups` on load
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    pub rules: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing)]
    pub repository_id: String,
    #[serde(skip)]
    pub snapshot_path: Option<PathBuf>,
    #[serde(skip)]
    pub properties: TemplateProperties,
    #[serde(skip)]
    pub installed: bool,
}

impl Template {
    /// Parse a template file, folding legacy `rules` into a group
    pub fn from_json(content: &[u8]) -> serde_json::Result<Self> {
        let mut template: Template = serde_json::from_slice(content)?;
        if !template.rules.is_empty() {
            let rules = std::mem::take(&mut template.rules);
            template.groups.push(serde_json::json!({
                "id": template.id,
                "rules": rules,
            }));
        }
        Ok(template)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    /// `id vversion (repository)`, for log and dialog text
    pub fn display_name(&self) -> String {
        format!("{} v{} ({})", self.id, self.version, self.repository_id)
    }
}

/// An external artifact a template needs at runtime
///
/// A dependency does not track install state; presence in the dependency
/// directory is inferred from file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    /// Where the artifact is downloaded from
    pub url: String,
    /// Optional SHA-256 of the artifact, checked after download
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            url: url.into(),
            sha256: None,
        }
    }

    /// Last path segment of the source URL, empty when there is none
    pub fn url_file_name(&self) -> &str {
        match self.url.rfind('/') {
            Some(pos) => &self.url[pos + 1..],
            None => "",
        }
    }

    /// Extension of the source file, `jar` when it has none
    pub fn artifact_extension(&self) -> &str {
        let file_name = self.url_file_name();
        match file_name.rfind('.') {
            Some(pos) if pos > 0 && pos + 1 < file_name.len() => &file_name[pos + 1..],
            _ => DEFAULT_ARTIFACT_EXTENSION,
        }
    }

    /// `<name>-<version>.<ext>`, the file name this dependency installs as
    pub fn file_name(&self) -> String {
        format!("{}-{}.{}", self.name, self.version, self.artifact_extension())
    }

    /// Case-insensitive identity used for conflict detection
    pub fn same_name(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

/// Flags gating whether a template may be exported or used
///
/// Persisted as a string map (`"false"`/`"true"`); unknown keys survive a
/// load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct TemplateProperties {
    pub not_allow_export: bool,
    pub disallow_to_use: bool,
    pub extra: BTreeMap<String, String>,
}

impl TemplateProperties {
    pub fn can_export(&self) -> bool {
        !self.not_allow_export
    }

    pub fn can_use(&self) -> bool {
        !self.disallow_to_use
    }
}

impl From<BTreeMap<String, String>> for TemplateProperties {
    fn from(mut map: BTreeMap<String, String>) -> Self {
        let flag = |value: Option<String>| {
            value
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };
        let not_allow_export = flag(map.remove(PROPERTY_NOT_ALLOW_EXPORT));
        let disallow_to_use = flag(map.remove(PROPERTY_DISALLOW_TO_USE));
        Self {
            not_allow_export,
            disallow_to_use,
            extra: map,
        }
    }
}

impl From<TemplateProperties> for BTreeMap<String, String> {
    fn from(properties: TemplateProperties) -> Self {
        let mut map = properties.extra;
        map.insert(
            PROPERTY_NOT_ALLOW_EXPORT.to_string(),
            properties.not_allow_export.to_string(),
        );
        map.insert(
            PROPERTY_DISALLOW_TO_USE.to_string(),
            properties.disallow_to_use.to_string(),
        );
        map
    }
}

/// Builder for a template about to be saved into the local repository
#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    id: String,
    version: String,
    description: String,
    changes: String,
    author: String,
    url: String,
    components: Option<String>,
    response_filters: Option<String>,
    groups: Vec<Value>,
    dependencies: Vec<Dependency>,
    snapshot: Option<Vec<u8>>,
    properties: TemplateProperties,
}

impl TemplateBuilder {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn changes(mut self, changes: impl Into<String>) -> Self {
        self.changes = changes.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn components(mut self, components: impl Into<String>) -> Self {
        self.components = Some(components.into());
        self
    }

    pub fn response_filters(mut self, filters: impl Into<String>) -> Self {
        self.response_filters = Some(filters.into());
        self
    }

    pub fn groups(mut self, groups: Vec<Value>) -> Self {
        self.groups = groups;
        self
    }

    pub fn dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// PNG bytes stored next to the template
    pub fn snapshot(mut self, png: Vec<u8>) -> Self {
        self.snapshot = Some(png);
        self
    }

    pub fn properties(mut self, properties: TemplateProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dependency_list(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn snapshot_bytes(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    /// Build the template record for `repository_id`
    pub fn build(&self, repository_id: &str) -> Template {
        Template {
            id: self.id.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            changes: self.changes.clone(),
            author: self.author.clone(),
            url: self.url.clone(),
            components: self.components.clone(),
            response_filters: self.response_filters.clone(),
            groups: self.groups.clone(),
            rules: Vec::new(),
            dependencies: self.dependencies.clone(),
            repository_id: repository_id.to_string(),
            snapshot_path: None,
            properties: self.properties.clone(),
            installed: false,
        }
    }
}
