//! Module Loader
//!
//! Resolves qualified unit names to registry exports, reading either an
//! archive or loose unit files. Archives are parsed once per loader and
//! kept in a cache keyed by their canonical path; loose units are read
//! again on every request.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::module::descriptor::{
    ArchiveManifest, StorageDescriptor, StorageKind, UnitDescriptor, ARCHIVE_FORMAT_VERSION,
    UNIT_ABI_VERSION,
};
use crate::module::registry::{PluginRegistry, TypeHandle};

/// Module loading errors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The archive, unit file, unit entry or export symbol does not exist.
    #[error("Unit '{name}' not found in '{location}': {reason}")]
    NotFound {
        /// Qualified unit name.
        name: String,
        /// Archive or directory searched.
        location: PathBuf,
        /// What exactly was missing.
        reason: String,
    },

    /// The archive or unit file is malformed or of an unsupported version.
    #[error("Malformed module '{location}': {reason}")]
    Format {
        /// Archive or unit file.
        location: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The resolved export does not satisfy the construction contract.
    #[error("Unit '{name}' violates the module contract: {reason}")]
    Contract {
        /// Qualified unit name.
        name: String,
        /// Which part of the contract failed.
        reason: String,
    },
}

/// A parsed archive.
#[derive(Debug)]
pub struct ArchiveContext {
    path: PathBuf,
    digest: [u8; 32],
    units: BTreeMap<String, UnitDescriptor>,
}

impl ArchiveContext {
    fn parse(path: PathBuf, bytes: &[u8]) -> Result<Self, LoadError> {
        let manifest: ArchiveManifest = serde_json::from_slice(bytes).map_err(|e| LoadError::Format {
            location: path.clone(),
            reason: e.to_string(),
        })?;
        if manifest.format != ARCHIVE_FORMAT_VERSION {
            return Err(LoadError::Format {
                location: path,
                reason: format!(
                    "archive format {} is not supported (expected {})",
                    manifest.format, ARCHIVE_FORMAT_VERSION
                ),
            });
        }

        let mut units = BTreeMap::new();
        for unit in manifest.units {
            if let Some(previous) = units.insert(unit.name.clone(), unit) {
                return Err(LoadError::Format {
                    location: path,
                    reason: format!("unit '{}' is packed more than once", previous.name),
                });
            }
        }

        Ok(Self {
            path,
            digest: Sha256::digest(bytes).into(),
            units,
        })
    }

    /// Canonical path of the archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA-256 of the archive bytes.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Number of units in the archive.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Look up a unit by qualified name.
    pub fn unit(&self, qualified_name: &str) -> Option<&UnitDescriptor> {
        self.units.get(qualified_name)
    }
}

/// Counters for what a loader actually read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Archive files read from disk.
    pub archive_reads: u32,
    /// Loose unit files read from disk.
    pub unit_reads: u32,
    /// Archive lookups served from the cache.
    pub cache_hits: u32,
}

/// Resolves unit names against one registry.
///
/// A loader lives for one game load; its archive cache goes with it.
pub struct ModuleLoader<'r> {
    registry: &'r PluginRegistry,
    archives: HashMap<PathBuf, ArchiveContext>,
    stats: LoadStats,
}

impl<'r> ModuleLoader<'r> {
    /// Create a loader with an empty cache.
    pub fn new(registry: &'r PluginRegistry) -> Self {
        Self {
            registry,
            archives: HashMap::new(),
            stats: LoadStats::default(),
        }
    }

    /// Resolve the unit `descriptor` points at.
    pub fn load(&mut self, descriptor: &StorageDescriptor) -> Result<TypeHandle<'r>, LoadError> {
        let unit = match descriptor.kind {
            StorageKind::Archive => self.load_from_archive(descriptor)?,
            StorageKind::Loose => self.load_loose(descriptor)?,
        };

        if unit.abi != UNIT_ABI_VERSION {
            return Err(LoadError::Format {
                location: descriptor.location.clone(),
                reason: format!(
                    "unit '{}' has ABI {} (expected {})",
                    unit.name, unit.abi, UNIT_ABI_VERSION
                ),
            });
        }

        let Some((symbol, export)) = self.registry.entry(&unit.symbol) else {
            return Err(LoadError::NotFound {
                name: descriptor.qualified_name.clone(),
                location: descriptor.location.clone(),
                reason: format!("export symbol '{}' is not registered", unit.symbol),
            });
        };
        trace!(
            "Resolved '{}' to {} '{}'.",
            descriptor.qualified_name,
            export.kind(),
            symbol
        );
        Ok(TypeHandle::new(descriptor.qualified_name.as_str(), symbol, export))
    }

    fn load_from_archive(&mut self, descriptor: &StorageDescriptor) -> Result<UnitDescriptor, LoadError> {
        let canonical = fs::canonicalize(&descriptor.location).map_err(|e| LoadError::NotFound {
            name: descriptor.qualified_name.clone(),
            location: descriptor.location.clone(),
            reason: format!("archive unavailable: {e}"),
        })?;

        if self.archives.contains_key(&canonical) {
            self.stats.cache_hits += 1;
        } else {
            let bytes = fs::read(&canonical).map_err(|e| LoadError::NotFound {
                name: descriptor.qualified_name.clone(),
                location: canonical.clone(),
                reason: format!("archive unreadable: {e}"),
            })?;
            self.stats.archive_reads += 1;
            let context = ArchiveContext::parse(canonical.clone(), &bytes)?;
            debug!(
                "Opened archive '{}' with {} units (sha256 {}).",
                canonical.display(),
                context.unit_count(),
                hex::encode(context.digest())
            );
            self.archives.insert(canonical.clone(), context);
        }

        self.archives
            .get(&canonical)
            .and_then(|context| context.unit(&descriptor.qualified_name))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                name: descriptor.qualified_name.clone(),
                location: canonical,
                reason: "no such unit in archive".to_string(),
            })
    }

    fn load_loose(&mut self, descriptor: &StorageDescriptor) -> Result<UnitDescriptor, LoadError> {
        let path = descriptor.unit_path();
        trace!("Reading unit file '{}'.", path.display());

        let bytes = fs::read(&path).map_err(|e| LoadError::NotFound {
            name: descriptor.qualified_name.clone(),
            location: descriptor.location.clone(),
            reason: format!("unit file '{}': {e}", path.display()),
        })?;
        self.stats.unit_reads += 1;

        let unit: UnitDescriptor = serde_json::from_slice(&bytes).map_err(|e| LoadError::Format {
            location: path.clone(),
            reason: e.to_string(),
        })?;
        if unit.name != descriptor.qualified_name {
            return Err(LoadError::Format {
                location: path,
                reason: format!(
                    "unit file defines '{}', expected '{}'",
                    unit.name, descriptor.qualified_name
                ),
            });
        }
        Ok(unit)
    }

    /// What this loader has read so far.
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Archives currently cached.
    pub fn cached_archives(&self) -> impl Iterator<Item = &ArchiveContext> {
        self.archives.values()
    }
}
