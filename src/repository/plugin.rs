// src/repository/plugin.rs

//! Pluggable repository sources
//!
//! Hosts register `SourceFactory` implementations by name in a
//! `SourceRegistry` owned by the engine. Factories flagged `auto_load`
//! contribute a repository on every refresh (the optional `central`
//! repository is one). The Local Store remembers which implementation
//! manages each repository so it is rebuilt with the same factory after a
//! restart.

use super::source::{RepositorySource, source_for_locator};
use crate::config::CentralRepositoryConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Factory for a host-provided repository source
pub trait SourceFactory: Send + Sync {
    /// Implementation name persisted in the Local Store
    fn implementation(&self) -> &str;

    /// Build the source serving repository `name` at `locator`
    fn create(&self, name: &str, locator: &str) -> Box<dyn RepositorySource>;

    /// Registered automatically on every refresh
    fn auto_load(&self) -> bool {
        false
    }

    /// `(name, locator)` used when the factory registers itself
    fn default_registration(&self) -> Option<(String, String)> {
        None
    }
}

/// Explicit set of pluggable factories, one per implementation name
#[derive(Default, Clone)]
pub struct SourceRegistry {
    factories: BTreeMap<String, Arc<dyn SourceFactory>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the central repository factory when one is configured
    pub fn with_central(central: Option<&CentralRepositoryConfig>) -> Self {
        let mut registry = Self::new();
        if let Some(central) = central {
            registry.register(Arc::new(CentralRepository::new(central.clone())));
        }
        registry
    }

    /// Add a factory; returns the factory it replaced, if any
    pub fn register(&mut self, factory: Arc<dyn SourceFactory>) -> Option<Arc<dyn SourceFactory>> {
        let name = factory.implementation().to_string();
        debug!("Registering repository source implementation {}", name);
        self.factories.insert(name, factory)
    }

    pub fn get(&self, implementation: &str) -> Option<Arc<dyn SourceFactory>> {
        self.factories.get(implementation).cloned()
    }

    pub fn auto_loaded(&self) -> impl Iterator<Item = &Arc<dyn SourceFactory>> {
        self.factories.values().filter(|f| f.auto_load())
    }

    pub fn implementations(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Auto-loaded remote repository configured in `EngineConfig::central`
pub struct CentralRepository {
    config: CentralRepositoryConfig,
}

impl CentralRepository {
    pub const IMPLEMENTATION: &'static str = "central";

    pub fn new(config: CentralRepositoryConfig) -> Self {
        Self { config }
    }
}

impl SourceFactory for CentralRepository {
    fn implementation(&self) -> &str {
        Self::IMPLEMENTATION
    }

    fn create(&self, name: &str, locator: &str) -> Box<dyn RepositorySource> {
        source_for_locator(name, locator)
    }

    fn auto_load(&self) -> bool {
        true
    }

    fn default_registration(&self) -> Option<(String, String)> {
        Some((self.config.name.clone(), self.config.url.clone()))
    }
}
