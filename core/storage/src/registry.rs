//! Driver registry for resolving adapters by name.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use ossdisk_common::{Error, Result};

use crate::adapter::FilesystemAdapter;

/// Factory function type for creating adapters.
pub type DriverFactory = Box<dyn Fn(Value) -> Result<Arc<dyn FilesystemAdapter>> + Send + Sync>;

/// Registry for filesystem driver factories.
///
/// Lets application code pick a backend by configured driver name instead
/// of constructing it directly.
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a driver factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: DriverFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Driver '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Build an adapter for `name` from its configuration.
    ///
    /// # Errors
    /// - Driver not found
    /// - Configuration rejected by the factory
    pub fn resolve(&self, name: &str, config: Value) -> Result<Arc<dyn FilesystemAdapter>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Driver '{}' is not registered", name)))?;
        factory(config)
    }

    /// Get list of registered driver names.
    pub fn drivers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a driver is registered.
    pub fn has_driver(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in drivers.
pub fn create_default_registry() -> Result<DriverRegistry> {
    let mut registry = DriverRegistry::new();

    registry.register("oss", Box::new(crate::oss::create_oss_adapter))?;

    // In-process bucket, for tests and local development.
    registry.register("memory", Box::new(crate::memory::create_memory_adapter))?;

    Ok(registry)
}
