//! # Strategy Simulator
//!
//! Host for turn-based games whose rules and players are loaded as modules.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    STRATEGY SIMULATOR                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  config.rs       - key = value game configuration            │
//! │                                                              │
//! │  engine/         - Lifecycle                                 │
//! │  ├── state.rs    - States and the transition table           │
//! │  ├── player.rs   - Participants and their manager link       │
//! │  ├── manager.rs  - Player managers                           │
//! │  └── logic.rs    - Rules hooks and the engine driving them   │
//! │                                                              │
//! │  module/         - Dynamic module resolution                 │
//! │  ├── descriptor.rs - Storage layouts and unit formats        │
//! │  ├── registry.rs - Export symbols compiled into the host     │
//! │  └── loader.rs   - Archive cache and loose unit loading      │
//! │                                                              │
//! │  simulator.rs    - Load a game, play it                      │
//! │                                                              │
//! │  games/          - Bundled games                             │
//! │  ├── empty/      - Does nothing, one round                   │
//! │  └── gomoku/     - Five in a row                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! Every game goes `reset -> initialise -> step* -> finalise`. The engine
//! rejects any call its current state does not allow, and a failing phase
//! leaves it `UNSTABLE` until the next reset.
//!
//! Hooks run strictly in seat order on the calling thread. Nothing is
//! parallel and nothing times out.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod games;
pub mod module;
pub mod simulator;

// Re-export commonly used types
pub use config::{ConfigError, Configuration};
pub use engine::{GameLogic, Phase, PlayerId, PlayerManager, Participant, Rules, Simulation, State, TransitionError};
pub use module::{LoadError, ModuleLoader, PluginRegistry, StorageDescriptor, StorageKind};
pub use simulator::{Simulator, SimulatorError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
