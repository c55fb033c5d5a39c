//! Named disks built from configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use ossdisk_common::{Error, Result};

use crate::adapter::FilesystemAdapter;
use crate::registry::DriverRegistry;

/// One configured disk: a driver name plus that driver's own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskConfig {
    pub driver: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

/// Disk configuration file.
///
/// ```json
/// {
///   "default": "media",
///   "disks": {
///     "media": { "driver": "oss", "bucket": "media", "...": "..." },
///     "scratch": { "driver": "memory" }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemsConfig {
    /// Disk used when none is named.
    pub default: String,
    pub disks: BTreeMap<String, DiskConfig>,
}

impl FilesystemsConfig {
    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Adapters for every configured disk, resolved once at startup.
pub struct DiskManager {
    disks: HashMap<String, Arc<dyn FilesystemAdapter>>,
    default: String,
}

impl DiskManager {
    /// Resolve every disk in `config` through `registry`.
    ///
    /// # Errors
    /// - The default disk is not configured
    /// - A disk names an unknown driver or carries invalid settings
    pub fn new(config: &FilesystemsConfig, registry: &DriverRegistry) -> Result<Self> {
        if !config.disks.contains_key(&config.default) {
            return Err(Error::InvalidInput(format!(
                "Default disk '{}' is not configured",
                config.default
            )));
        }

        let mut disks = HashMap::with_capacity(config.disks.len());
        for (name, disk) in &config.disks {
            let adapter = registry.resolve(&disk.driver, Value::Object(disk.options.clone()))?;
            debug!(disk = %name, driver = %disk.driver, "disk resolved");
            disks.insert(name.clone(), adapter);
        }

        Ok(Self {
            disks,
            default: config.default.clone(),
        })
    }

    /// Get a disk by name.
    pub fn disk(&self, name: &str) -> Result<Arc<dyn FilesystemAdapter>> {
        self.disks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Disk '{}' is not configured", name)))
    }

    /// Get the default disk.
    pub fn default_disk(&self) -> Result<Arc<dyn FilesystemAdapter>> {
        self.disk(&self.default)
    }

    pub fn default_name(&self) -> &str {
        &self.default
    }

    /// Names of all configured disks.
    pub fn disks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.disks.keys().cloned().collect();
        names.sort();
        names
    }
}
