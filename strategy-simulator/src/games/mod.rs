//! Bundled games.
//!
//! Each game registers its exports under its own symbol prefix; module
//! files on disk refer to these symbols.

pub mod empty;
pub mod gomoku;

use crate::module::PluginRegistry;

/// Register every bundled game.
pub fn register_bundled(registry: &mut PluginRegistry) {
    empty::register(registry);
    gomoku::register(registry);
}

/// A registry holding every bundled game.
pub fn bundled_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    register_bundled(&mut registry);
    registry
}
