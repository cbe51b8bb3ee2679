// src/template/catalog.rs

//! Repository catalog: template id to known versions
//!
//! Catalog file format (unknown fields are ignored):
//!
//! ```json
//! { "wordpress": { "versions": ["1.0", "1.1"] } }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Versions of one template, in catalog order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersions {
    #[serde(default)]
    pub versions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_display_name: Option<String>,
}

impl TemplateVersions {
    pub fn new(versions: Vec<String>) -> Self {
        let mut entry = Self::default();
        for version in versions {
            entry.add(version);
        }
        entry
    }

    /// Returns false when the version was already listed
    pub fn add(&mut self, version: String) -> bool {
        if self.versions.contains(&version) {
            return false;
        }
        self.versions.push(version);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub templates: BTreeMap<String, TemplateVersions>,
}

/// One catalog row as reported to callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCatalogEntry {
    pub repository_id: String,
    pub template_id: String,
    pub versions: Vec<String>,
}

impl Catalog {
    pub fn parse(content: &[u8]) -> Result<Self> {
        serde_json::from_slice(content).map_err(|e| {
            Error::ParseError(format!(
                "Content does not conform to JSON syntax; expected a template catalog: {e}"
            ))
        })
    }

    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Returns false when the version was already listed
    pub fn add_version(&mut self, template_id: &str, version: &str) -> bool {
        self.templates
            .entry(template_id.to_string())
            .or_default()
            .add(version.to_string())
    }

    pub fn versions(&self, template_id: &str) -> &[String] {
        self.templates
            .get(template_id)
            .map(|entry| entry.versions.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, template_id: &str, version: &str) -> bool {
        self.versions(template_id).iter().any(|v| v == version)
    }

    /// Every `(template_id, version)` pair in id order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().flat_map(|(id, entry)| {
            entry
                .versions
                .iter()
                .map(move |version| (id.as_str(), version.as_str()))
        })
    }

    /// Keep only the pairs `keep` accepts; returns how many were dropped
    ///
    /// A template left without versions by this is removed as well.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut dropped = 0;
        self.templates.retain(|id, entry| {
            let before = entry.versions.len();
            entry.versions.retain(|version| keep(id, version));
            dropped += before - entry.versions.len();
            before == 0 || !entry.versions.is_empty()
        });
        dropped
    }

    pub fn entries(&self, repository_id: &str) -> Vec<TemplateCatalogEntry> {
        self.templates
            .iter()
            .map(|(id, entry)| TemplateCatalogEntry {
                repository_id: repository_id.to_string(),
                template_id: id.clone(),
                versions: entry.versions.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
