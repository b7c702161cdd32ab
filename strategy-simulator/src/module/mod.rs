//! Dynamic module resolution.
//!
//! - `descriptor` - storage layouts and the on-disk unit/archive formats
//! - `registry`   - export symbols compiled into the host
//! - `loader`     - resolves qualified names to exports, caching archives

pub mod descriptor;
pub mod loader;
pub mod registry;

pub use descriptor::{StorageDescriptor, StorageKind, UnitDescriptor};
pub use loader::{ArchiveContext, LoadError, LoadStats, ModuleLoader};
pub use registry::{Export, PluginRegistry, TypeHandle, TypeTag};
