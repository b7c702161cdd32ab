//! Game Configuration
//!
//! Flat key/value configuration read from a game configuration file.
//! Keys are dotted paths (`game.width`, `player.1.class`); hierarchical
//! access works by prefix through [`Configuration::subset`].
//!
//! ## File Format
//!
//! ```text
//! # Comments start with '#' or '!'
//! game.package = gomoku
//! game.type    = jar
//! player.1.class = CornerPlayer
//! ```
//!
//! Whitespace around keys and values is trimmed, blank lines are skipped
//! and a repeated key overrides the earlier value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::trace;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line is not a `key = value` pair.
    #[error("Line {line}: expected 'key = value', got '{content}'")]
    Syntax {
        /// 1-based line number.
        line: usize,
        /// Offending line, trimmed.
        content: String,
    },

    /// A mandatory entry is missing.
    #[error("Missing mandatory configuration entry '{0}'")]
    Missing(String),

    /// An entry holds a value of the wrong shape.
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    Invalid {
        /// Entry key.
        key: String,
        /// Entry value as written.
        value: String,
        /// What was expected instead.
        reason: String,
    },

    /// No `player.<N>.class` entry exists.
    #[error("No player configuration found")]
    NoPlayers,
}

/// Read-only key/value view handed to games, managers and players.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: BTreeMap<String, String>,
}

impl Configuration {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        trace!("Reading configuration file '{}'", path.display());
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Set an entry, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get an entry.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get an entry that must be present.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Check if an entry is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get an entry parsed as an integer.
    ///
    /// Returns `Ok(None)` when the entry is absent.
    pub fn get_integer(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.get(key)
            .map(|value| {
                value.parse::<i64>().map_err(|_| ConfigError::Invalid {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "expected an integer".to_string(),
                })
            })
            .transpose()
    }

    /// Get an entry parsed as a boolean (`true`/`false`, `yes`/`no`, `1`/`0`).
    ///
    /// Returns `Ok(None)` when the entry is absent.
    pub fn get_boolean(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(ConfigError::Invalid {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: "expected a boolean".to_string(),
                }),
            })
            .transpose()
    }

    /// All entries under `prefix`, with the prefix stripped from their keys.
    ///
    /// `subset("player.1.")` turns `player.1.class` into `class`.
    pub fn subset(&self, prefix: &str) -> Configuration {
        let entries = self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key[prefix.len()..].to_string(), value.clone()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Configuration { entries }
    }

    /// Group numbers `N` with a `player.<N>.class` entry, ascending.
    pub fn player_groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = self
            .entries
            .keys()
            .filter_map(|key| {
                let number = key.strip_prefix("player.")?.strip_suffix(".class")?;
                if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                number.parse().ok()
            })
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromStr for Configuration {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut config = Configuration::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Syntax {
                    line: index + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Syntax {
                    line: index + 1,
                    content: line.to_string(),
                });
            }
            config.set(key, value.trim());
        }
        Ok(config)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Configuration::new();
        for (key, value) in iter {
            config.set(key, value);
        }
        config
    }
}
