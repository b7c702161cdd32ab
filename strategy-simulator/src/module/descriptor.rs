//! Storage Descriptors and On-Disk Formats
//!
//! A game module lives either in a single archive file or as loose unit
//! files in a directory tree. Both bind qualified names such as
//! `gomoku.PlayerManager` to export symbols registered by the host.
//!
//! ## Archive
//!
//! ```text
//! {
//!   "format": 1,
//!   "units": [
//!     { "name": "gomoku.GameLogic", "symbol": "gomoku::engine" },
//!     { "name": "gomoku.Players.CornerPlayer", "symbol": "gomoku::players::corner" }
//!   ]
//! }
//! ```
//!
//! ## Loose unit
//!
//! One file per unit, `<directory>/<simple name>.unit`:
//!
//! ```text
//! { "name": "gomoku.Players.CornerPlayer", "symbol": "gomoku::players::corner", "abi": 1 }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit ABI version understood by this host.
pub const UNIT_ABI_VERSION: u32 = 1;

/// Archive format version understood by this host.
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

/// File extension of loose units.
pub const UNIT_EXTENSION: &str = "unit";

/// Storage layout of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Single archive file (`jar`).
    Archive,
    /// Directory of loose unit files (`class`).
    Loose,
}

impl StorageKind {
    /// Value used for this kind in configuration files.
    pub fn as_config_value(self) -> &'static str {
        match self {
            StorageKind::Archive => "jar",
            StorageKind::Loose => "class",
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "jar" => Ok(StorageKind::Archive),
            "class" => Ok(StorageKind::Loose),
            other => Err(format!("expected 'jar' or 'class', got '{other}'")),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_config_value())
    }
}

/// Where to find one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageDescriptor {
    /// Archive file, or the directory holding the unit file.
    pub location: PathBuf,
    /// Storage layout.
    pub kind: StorageKind,
    /// Fully qualified unit name, e.g. `gomoku.Players.CornerPlayer`.
    pub qualified_name: String,
}

impl StorageDescriptor {
    /// Create a descriptor.
    pub fn new(location: impl Into<PathBuf>, kind: StorageKind, qualified_name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind,
            qualified_name: qualified_name.into(),
        }
    }

    /// Last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.qualified_name)
    }

    /// Path of the loose unit file this descriptor points at.
    pub fn unit_path(&self) -> PathBuf {
        self.location
            .join(format!("{}.{}", self.simple_name(), UNIT_EXTENSION))
    }
}

/// One unit record, as stored in an archive or a loose unit file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Fully qualified unit name.
    pub name: String,
    /// Export symbol in the host registry.
    pub symbol: String,
    /// Unit ABI version.
    #[serde(default = "default_abi")]
    pub abi: u32,
}

fn default_abi() -> u32 {
    UNIT_ABI_VERSION
}

/// Archive file contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Archive format version.
    pub format: u32,
    /// Units packed into the archive.
    pub units: Vec<UnitDescriptor>,
}

/// Last dot-separated segment of a qualified name.
pub fn simple_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit('.')
        .next()
        .unwrap_or(qualified_name)
}

/// Turn a dotted package name into a relative directory path.
pub fn package_path(package: &str) -> PathBuf {
    package.split('.').filter(|s| !s.is_empty()).collect()
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
