//! Plugin Registry
//!
//! Game code is compiled into the host and registered here under export
//! symbols. Module files only name those symbols, so the host can build a
//! game it has no compile-time knowledge of: every value crosses the
//! registry boundary as `Box<dyn Any>`, and every export records the
//! [`TypeTag`]s the loader compares before anything is constructed.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::Configuration;
use crate::engine::{GameLogic, PlayerId, PlayerManager, Rules, Simulation};
use crate::module::loader::LoadError;

// =============================================================================
// TYPE TAGS
// =============================================================================

/// Runtime identity of a type, with its name for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Tag of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased value did not have the type its receiver expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a value of type {expected}")]
pub struct ContractViolation {
    /// Name of the expected type.
    pub expected: &'static str,
}

impl ContractViolation {
    fn expecting<T: ?Sized + 'static>() -> Self {
        Self {
            expected: std::any::type_name::<T>(),
        }
    }
}

// =============================================================================
// EXPORTS
// =============================================================================

/// Builds an engine from the configuration and the erased managers.
pub type EngineFactory =
    Box<dyn Fn(Configuration, Vec<Box<dyn Any>>) -> Result<Box<dyn Simulation>, ContractViolation>>;

/// Builds an erased manager around an erased participant.
pub type ManagerFactory =
    Box<dyn Fn(Box<dyn Any>, PlayerId, Configuration) -> Result<Box<dyn Any>, ContractViolation>>;

/// Builds an erased participant with no arguments.
pub type ParticipantFactory = Box<dyn Fn() -> Box<dyn Any>>;

/// A game engine.
pub struct EngineExport {
    /// Manager type the engine is built from.
    pub manager: TypeTag,
    /// Constructor.
    pub construct: EngineFactory,
}

/// The capability interface managers expose to participants.
pub struct InterfaceExport {
    /// The interface type.
    pub interface: TypeTag,
}

/// A player manager.
pub struct ManagerExport {
    /// The manager type.
    pub manager: TypeTag,
    /// Base participant type it accepts.
    pub player: TypeTag,
    /// Capability interface it provides.
    pub interface: TypeTag,
    /// Constructor.
    pub construct: ManagerFactory,
}

/// The base participant type of a game.
pub struct BaseExport {
    /// The base participant type.
    pub player: TypeTag,
}

/// A concrete participant.
pub struct ParticipantExport {
    /// Base participant type it produces.
    pub base: TypeTag,
    /// Name of the concrete type.
    pub concrete: &'static str,
    /// Zero-argument constructor.
    pub construct: ParticipantFactory,
}

/// Anything a unit may resolve to.
pub enum Export {
    /// See [`EngineExport`].
    Engine(EngineExport),
    /// See [`InterfaceExport`].
    Interface(InterfaceExport),
    /// See [`ManagerExport`].
    Manager(ManagerExport),
    /// See [`BaseExport`].
    BaseParticipant(BaseExport),
    /// See [`ParticipantExport`].
    Participant(ParticipantExport),
}

impl Export {
    /// Short name of the export kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Export::Engine(_) => "engine",
            Export::Interface(_) => "manager interface",
            Export::Manager(_) => "player manager",
            Export::BaseParticipant(_) => "base player",
            Export::Participant(_) => "player",
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Export symbols known to the host.
#[derive(Default)]
pub struct PluginRegistry {
    exports: BTreeMap<String, Export>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an export under `symbol`.
    ///
    /// Panics if the symbol is already registered.
    pub fn register(&mut self, symbol: impl Into<String>, export: Export) {
        let symbol = symbol.into();
        if self.exports.contains_key(&symbol) {
            panic!("Export symbol '{}' already registered", symbol);
        }
        self.exports.insert(symbol, export);
    }

    /// Register the engine built from rules `R`.
    pub fn register_engine<R: Rules>(&mut self, symbol: &str) {
        let construct: EngineFactory = Box::new(
            |configuration: Configuration,
             managers: Vec<Box<dyn Any>>|
             -> Result<Box<dyn Simulation>, ContractViolation> {
                let managers = managers
                    .into_iter()
                    .map(|manager| {
                        manager
                            .downcast::<R::Manager>()
                            .map(|m| *m)
                            .map_err(|_| ContractViolation::expecting::<R::Manager>())
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(GameLogic::<R>::new(configuration, managers)) as Box<dyn Simulation>)
            },
        );
        self.register(
            symbol,
            Export::Engine(EngineExport {
                manager: TypeTag::of::<R::Manager>(),
                construct,
            }),
        );
    }

    /// Register the capability interface `I`.
    pub fn register_interface<I: ?Sized + 'static>(&mut self, symbol: &str) {
        self.register(
            symbol,
            Export::Interface(InterfaceExport {
                interface: TypeTag::of::<I>(),
            }),
        );
    }

    /// Register the manager type `M`.
    ///
    /// The erased participant it receives must be a `Box<M::Player>`.
    pub fn register_manager<M: PlayerManager>(&mut self, symbol: &str) {
        let construct: ManagerFactory = Box::new(
            |player: Box<dyn Any>,
             player_id: PlayerId,
             configuration: Configuration|
             -> Result<Box<dyn Any>, ContractViolation> {
                let player = player
                    .downcast::<Box<M::Player>>()
                    .map_err(|_| ContractViolation::expecting::<Box<M::Player>>())?;
                Ok(Box::new(M::from_parts(*player, player_id, configuration)) as Box<dyn Any>)
            },
        );
        self.register(
            symbol,
            Export::Manager(ManagerExport {
                manager: TypeTag::of::<M>(),
                player: TypeTag::of::<M::Player>(),
                interface: TypeTag::of::<M::Interface>(),
                construct,
            }),
        );
    }

    /// Register the base participant type `B` (usually a trait object).
    pub fn register_base<B: ?Sized + 'static>(&mut self, symbol: &str) {
        self.register(
            symbol,
            Export::BaseParticipant(BaseExport {
                player: TypeTag::of::<B>(),
            }),
        );
    }

    /// Register a concrete participant that `make` builds as a `Box<B>`.
    pub fn register_participant<B: ?Sized + 'static>(
        &mut self,
        symbol: &str,
        concrete: &'static str,
        make: fn() -> Box<B>,
    ) {
        self.register(
            symbol,
            Export::Participant(ParticipantExport {
                base: TypeTag::of::<B>(),
                concrete,
                construct: Box::new(move || Box::new(make()) as Box<dyn Any>),
            }),
        );
    }

    /// Look up an export.
    pub fn get(&self, symbol: &str) -> Option<&Export> {
        self.exports.get(symbol)
    }

    /// Look up an export together with its stored symbol.
    pub fn entry(&self, symbol: &str) -> Option<(&str, &Export)> {
        self.exports
            .get_key_value(symbol)
            .map(|(symbol, export)| (symbol.as_str(), export))
    }

    /// Registered symbols, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }

    /// Number of exports.
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

// =============================================================================
// TYPE HANDLES
// =============================================================================

/// A resolved unit: the qualified name it was loaded as and its export.
#[derive(Clone)]
pub struct TypeHandle<'r> {
    qualified_name: String,
    symbol: &'r str,
    export: &'r Export,
}

impl<'r> TypeHandle<'r> {
    pub(crate) fn new(qualified_name: impl Into<String>, symbol: &'r str, export: &'r Export) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            symbol,
            export,
        }
    }

    /// Qualified name of the unit.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Export symbol the unit resolved to.
    pub fn symbol(&self) -> &'r str {
        self.symbol
    }

    /// The export itself.
    pub fn export(&self) -> &'r Export {
        self.export
    }

    fn mismatch(&self, expected: &str) -> LoadError {
        LoadError::Contract {
            name: self.qualified_name.clone(),
            reason: format!("expected {} export, '{}' is {}", expected, self.symbol, self.export.kind()),
        }
    }

    /// The export as an engine.
    pub fn as_engine(&self) -> Result<&'r EngineExport, LoadError> {
        match self.export {
            Export::Engine(e) => Ok(e),
            _ => Err(self.mismatch("an engine")),
        }
    }

    /// The export as a capability interface.
    pub fn as_interface(&self) -> Result<&'r InterfaceExport, LoadError> {
        match self.export {
            Export::Interface(e) => Ok(e),
            _ => Err(self.mismatch("a manager interface")),
        }
    }

    /// The export as a player manager.
    pub fn as_manager(&self) -> Result<&'r ManagerExport, LoadError> {
        match self.export {
            Export::Manager(e) => Ok(e),
            _ => Err(self.mismatch("a player manager")),
        }
    }

    /// The export as a base participant.
    pub fn as_base(&self) -> Result<&'r BaseExport, LoadError> {
        match self.export {
            Export::BaseParticipant(e) => Ok(e),
            _ => Err(self.mismatch("a base player")),
        }
    }

    /// The export as a concrete participant.
    pub fn as_participant(&self) -> Result<&'r ParticipantExport, LoadError> {
        match self.export {
            Export::Participant(e) => Ok(e),
            _ => Err(self.mismatch("a player")),
        }
    }
}

impl fmt::Debug for TypeHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeHandle")
            .field("qualified_name", &self.qualified_name)
            .field("symbol", &self.symbol)
            .field("kind", &self.export.kind())
            .finish()
    }
}
