// src/template/mod.rs

//! Template data model
//!
//! - `model`: template version files, dependencies, properties, builder
//! - `catalog`: per-repository id to versions listing
//! - `version`: next-version proposals over dotted numeric versions
//! - `validation`: batch validation of ids, templates and registrations

mod catalog;
mod model;

pub mod validation;
pub mod version;

pub use catalog::{Catalog, TemplateCatalogEntry, TemplateVersions};
pub use model::{
    Dependency, PROPERTY_DISALLOW_TO_USE, PROPERTY_NOT_ALLOW_EXPORT, Template, TemplateBuilder,
    TemplateProperties,
};
