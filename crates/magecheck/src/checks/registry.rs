//! Name to factory mapping for check modules.

use indexmap::IndexMap;

use crate::error::{MagetabError, Result};

use super::archive::ArchiveChecks;
use super::atlas::AtlasChecks;
use super::CheckModule;

/// Name of the built-in archive submission checks.
pub const ARCHIVE_MODULE: &str = "archive";
/// Name of the built-in expression atlas checks.
pub const ATLAS_MODULE: &str = "atlas";

/// Creates a fresh module instance for one pipeline run.
pub type CheckModuleFactory = Box<dyn Fn() -> Box<dyn CheckModule>>;

/// Resolves check module names to instances.
pub struct CheckModuleRegistry {
    factories: IndexMap<String, CheckModuleFactory>,
}

impl CheckModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Create a registry holding the built-in modules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ARCHIVE_MODULE, || Box::new(ArchiveChecks::new()));
        registry.register(ATLAS_MODULE, || Box::new(AtlasChecks::new()));
        registry
    }

    /// Register (or replace) a module factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn CheckModule> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }

    /// Instantiate the named module.
    pub fn create(&self, name: &str) -> Result<Box<dyn CheckModule>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| MagetabError::UnknownCheckModule(name.to_string()))
    }
}

impl Default for CheckModuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
