//! Simulator
//!
//! Loads a game from its configuration file and plays it through the
//! lifecycle. Loading resolves the game's units with a fresh
//! [`ModuleLoader`], checks that the exports fit together, builds every
//! participant and manager, and only then builds the engine. Nothing is
//! kept from a load that fails.

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, trace};

use crate::config::{ConfigError, Configuration};
use crate::engine::{Phase, PlayerId, Simulation, TransitionError};
use crate::module::descriptor::{package_path, resolve_against};
use crate::module::registry::ParticipantExport;
use crate::module::{LoadError, LoadStats, ModuleLoader, PluginRegistry, StorageDescriptor, StorageKind};

/// Simple name of the engine unit.
pub const ENGINE_UNIT: &str = "GameLogic";
/// Simple name of the capability interface unit.
pub const INTERFACE_UNIT: &str = "ManagerInterface";
/// Simple name of the player manager unit.
pub const MANAGER_UNIT: &str = "PlayerManager";
/// Simple name of the base participant unit.
pub const BASE_PLAYER_UNIT: &str = "Player";
/// Sub-package holding the concrete participants.
pub const PLAYERS_PACKAGE: &str = "Players";

/// Simulator errors.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// The configuration could not be read or is incomplete.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A unit could not be resolved or breaks the module contract.
    #[error("Module error: {0}")]
    Module(#[from] LoadError),

    /// The engine was driven out of order.
    #[error("Lifecycle error: {0}")]
    Transition(#[from] TransitionError),

    /// `play_game` was called without a loaded game.
    #[error("No game loaded")]
    NoGameLoaded,

    /// A lifecycle phase reported failure.
    #[error("Failed to {0} the game")]
    PhaseFailed(Phase),
}

/// Validated `game.*` settings.
#[derive(Debug)]
struct GameSettings {
    package: String,
    kind: StorageKind,
    path: PathBuf,
    groups: Vec<u32>,
}

impl GameSettings {
    fn from_configuration(configuration: &Configuration, directory: &Path) -> Result<Self, ConfigError> {
        let package = configuration.require("game.package")?.to_string();
        let kind = parse_kind(configuration, "game.type")?;
        let path = resolve_against(directory, Path::new(configuration.require("game.path")?));

        let groups = configuration.player_groups();
        if groups.is_empty() {
            return Err(ConfigError::NoPlayers);
        }

        Ok(Self {
            package,
            kind,
            path,
            groups,
        })
    }

    fn qualified(&self, simple_name: &str) -> String {
        format!("{}.{}", self.package, simple_name)
    }

    /// Where the game's own units live for `kind`.
    fn unit_location(&self, kind: StorageKind) -> PathBuf {
        match kind {
            StorageKind::Archive => self.path.clone(),
            StorageKind::Loose => self.path.join(package_path(&self.package)),
        }
    }
}

fn parse_kind(configuration: &Configuration, key: &str) -> Result<StorageKind, ConfigError> {
    let value = configuration.require(key)?;
    value.parse().map_err(|reason| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    })
}

fn contract(name: impl Into<String>, reason: impl Into<String>) -> LoadError {
    LoadError::Contract {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Loads and plays games.
pub struct Simulator {
    registry: PluginRegistry,
    game: Option<Box<dyn Simulation>>,
    load_stats: Option<LoadStats>,
}

impl Simulator {
    /// Create a simulator resolving units against `registry`.
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            game: None,
            load_stats: None,
        }
    }

    /// The registry units are resolved against.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// The loaded game, if any.
    pub fn game(&self) -> Option<&dyn Simulation> {
        self.game.as_deref()
    }

    /// Take the loaded game out, to drive it by hand.
    pub fn take_game(&mut self) -> Option<Box<dyn Simulation>> {
        self.game.take()
    }

    /// What the last successful load read from disk.
    pub fn load_stats(&self) -> Option<LoadStats> {
        self.load_stats
    }

    /// Load the game described by `config_file`, replacing any loaded game.
    pub fn load_game(&mut self, config_file: &Path) -> Result<(), SimulatorError> {
        trace!("Loading configuration file '{}'.", config_file.display());
        self.game = None;
        self.load_stats = None;

        let configuration = Configuration::load(config_file)?;
        let directory = configuration_directory(config_file)?;
        let settings = GameSettings::from_configuration(&configuration, &directory)?;
        match configuration.get("game.name") {
            Some(name) => info!("Loaded configuration for '{}'.", name),
            None => info!("Loaded configuration."),
        }

        debug!("Loading game units.");
        let mut loader = ModuleLoader::new(&self.registry);
        let game = build_game(&mut loader, configuration, &directory, &settings)?;

        info!(
            "'{}' successfully loaded with {} players.",
            game.name(),
            game.player_count()
        );
        for identity in game.player_identities() {
            debug!("Seated player {}.", identity);
        }

        self.load_stats = Some(loader.stats());
        self.game = Some(game);
        Ok(())
    }

    /// Play the loaded game from reset to finalise.
    pub fn play_game(&mut self) -> Result<(), SimulatorError> {
        let Some(game) = self.game.as_mut() else {
            error!("No game loaded, can not start simulation.");
            return Err(SimulatorError::NoGameLoaded);
        };

        info!("Starting simulation, resetting {}.", game.name());
        if !game.reset_wrapper()? {
            error!("Failed to reset {}.", game.name());
            return Err(SimulatorError::PhaseFailed(Phase::Reset));
        }

        trace!("Initialising {}.", game.name());
        if !game.initialise_wrapper()? {
            error!("Failed to initialise {}.", game.name());
            return Err(SimulatorError::PhaseFailed(Phase::Initialise));
        }

        trace!("Stepping simulation.");
        while game.step_wrapper()? {}

        trace!("Game finished after {} rounds, finalising {}.", game.round(), game.name());
        if !game.finalise_wrapper()? {
            error!("Failed to finalise {}.", game.name());
            return Err(SimulatorError::PhaseFailed(Phase::Finalise));
        }

        trace!("Simulation successfully ended.");
        Ok(())
    }
}

fn configuration_directory(config_file: &Path) -> Result<PathBuf, ConfigError> {
    let parent = config_file.parent().unwrap_or_else(|| Path::new(""));
    if parent.is_absolute() {
        return Ok(parent.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: config_file.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(parent))
}

fn build_game(
    loader: &mut ModuleLoader<'_>,
    configuration: Configuration,
    directory: &Path,
    settings: &GameSettings,
) -> Result<Box<dyn Simulation>, SimulatorError> {
    let location = settings.unit_location(settings.kind);
    let game_unit = |simple: &str| StorageDescriptor::new(location.clone(), settings.kind, settings.qualified(simple));

    let engine_handle = loader.load(&game_unit(ENGINE_UNIT))?;
    let engine = engine_handle.as_engine()?;
    debug!("Loaded the engine.");

    let interface_handle = loader.load(&game_unit(INTERFACE_UNIT))?;
    let interface = interface_handle.as_interface()?;
    debug!("Loaded the manager interface.");

    let manager_handle = loader.load(&game_unit(MANAGER_UNIT))?;
    let manager = manager_handle.as_manager()?;
    debug!("Loaded the player manager.");

    let base_handle = loader.load(&game_unit(BASE_PLAYER_UNIT))?;
    let base = base_handle.as_base()?;
    debug!("Loaded the base player.");

    if manager.player != base.player {
        return Err(contract(
            manager_handle.qualified_name(),
            format!("manages {} but the base player is {}", manager.player, base.player),
        )
        .into());
    }
    if manager.interface != interface.interface {
        return Err(contract(
            manager_handle.qualified_name(),
            format!("provides {} but the manager interface is {}", manager.interface, interface.interface),
        )
        .into());
    }
    if engine.manager != manager.manager {
        return Err(contract(
            engine_handle.qualified_name(),
            format!("expects managers of type {} but got {}", engine.manager, manager.manager),
        )
        .into());
    }

    let mut participants: HashMap<String, &ParticipantExport> = HashMap::new();
    let mut managers: Vec<Box<dyn Any>> = Vec::new();
    let mut next_id: u64 = 1;

    for group in &settings.groups {
        let prefix = format!("player.{group}.");
        trace!("Loading player group {}.", group);

        let class = configuration.require(&format!("{prefix}class"))?;
        let kind = match configuration.get(&format!("{prefix}type")) {
            Some(_) => parse_kind(&configuration, &format!("{prefix}type"))?,
            None => settings.kind,
        };
        let path = match configuration.get(&format!("{prefix}path")) {
            Some(path) => resolve_against(directory, Path::new(path)),
            None => match kind {
                StorageKind::Archive => settings.unit_location(kind),
                StorageKind::Loose => settings.unit_location(kind).join(PLAYERS_PACKAGE),
            },
        };
        let instances_key = format!("{prefix}instances");
        let instances = configuration.get_integer(&instances_key)?.unwrap_or(1);
        if instances < 1 {
            return Err(ConfigError::Invalid {
                key: instances_key,
                value: instances.to_string(),
                reason: "at least one instance is required".to_string(),
            }
            .into());
        }
        let shown = configuration.get(&format!("{prefix}name")).unwrap_or("null");
        trace!("Adding {} {} as {}.", instances, class, shown);

        let participant = match participants.get(class) {
            Some(participant) => *participant,
            None => {
                let qualified = settings.qualified(&format!("{PLAYERS_PACKAGE}.{class}"));
                let handle = loader.load(&StorageDescriptor::new(path, kind, qualified))?;
                let participant = handle.as_participant()?;
                if participant.base != base.player {
                    return Err(contract(
                        handle.qualified_name(),
                        format!("{} is not a {}", participant.concrete, base.player),
                    )
                    .into());
                }
                participants.insert(class.to_string(), participant);
                participant
            }
        };

        let player_configuration = configuration.subset(&prefix);
        for _ in 0..instances {
            let player_id = PlayerId::new(next_id);
            let player = (participant.construct)();
            let erased = (manager.construct)(player, player_id, player_configuration.clone())
                .map_err(|e| contract(manager_handle.qualified_name(), e.to_string()))?;
            managers.push(erased);
            next_id += 1;
        }
    }

    let game = (engine.construct)(configuration, managers)
        .map_err(|e| contract(engine_handle.qualified_name(), e.to_string()))?;
    debug!("The engine was constructed with all the game elements.");
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("game.cfg");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_play_without_game() {
        let mut simulator = Simulator::new(PluginRegistry::new());
        assert!(matches!(simulator.play_game(), Err(SimulatorError::NoGameLoaded)));
        assert!(simulator.game().is_none());
    }

    #[test]
    fn test_missing_mandatory_entries() {
        let dir = TempDir::new().unwrap();
        let mut simulator = Simulator::new(PluginRegistry::new());

        let config = write_config(dir.path(), "game.type = jar\ngame.path = x\nplayer.1.class = A\n");
        let err = simulator.load_game(&config).unwrap_err();
        assert!(matches!(err, SimulatorError::Config(ConfigError::Missing(ref key)) if key == "game.package"));

        let config = write_config(dir.path(), "game.package = p\ngame.type = zip\ngame.path = x\nplayer.1.class = A\n");
        let err = simulator.load_game(&config).unwrap_err();
        assert!(matches!(err, SimulatorError::Config(ConfigError::Invalid { ref key, .. }) if key == "game.type"));

        let config = write_config(dir.path(), "game.package = p\ngame.type = class\ngame.path = x\n");
        let err = simulator.load_game(&config).unwrap_err();
        assert!(matches!(err, SimulatorError::Config(ConfigError::NoPlayers)));
        assert!(simulator.game().is_none());
        assert!(simulator.load_stats().is_none());
    }

    #[test]
    fn test_missing_module_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut simulator = Simulator::new(PluginRegistry::new());

        let config = write_config(dir.path(), "game.package = p\ngame.type = jar\ngame.path = p.json\nplayer.1.class = A\n");
        let err = simulator.load_game(&config).unwrap_err();
        assert!(matches!(err, SimulatorError::Module(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_game_settings_locations() {
        let configuration: Configuration = [
            ("game.package", "org.demo"),
            ("game.type", "class"),
            ("game.path", "units"),
            ("player.1.class", "A"),
        ]
        .into_iter()
        .collect();
        let settings = GameSettings::from_configuration(&configuration, Path::new("/cfg")).unwrap();

        assert_eq!(settings.qualified(ENGINE_UNIT), "org.demo.GameLogic");
        assert_eq!(settings.unit_location(StorageKind::Loose), PathBuf::from("/cfg/units/org/demo"));
        assert_eq!(settings.unit_location(StorageKind::Archive), PathBuf::from("/cfg/units"));
    }
}
