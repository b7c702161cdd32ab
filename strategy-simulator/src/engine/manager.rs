//! Player Managers
//!
//! A manager owns exactly one participant and sits between it and the
//! engine. It carries the player's identity and its slice of the
//! configuration, forwards the lifecycle hooks, and exposes the
//! game-specific capability interface the participant plays against.

use tracing::debug;

use crate::config::Configuration;
use crate::engine::player::{ManagerLink, Participant, PlayerId};

/// What a manager knows about the engine it was handed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineLink {
    /// Name of the game.
    pub game_name: String,
    /// Seat of this manager, starting at 1.
    pub seat: usize,
    /// Number of seats in the game.
    pub seats: usize,
}

/// State every manager carries, whatever the game.
pub struct ManagerCore<P: ?Sized + Participant> {
    /// The managed participant.
    pub player: Box<P>,
    /// Globally unique id of the player.
    pub player_id: PlayerId,
    /// The `player.<N>.` part of the configuration, prefix stripped.
    pub configuration: Configuration,
    /// Set once the engine takes ownership of the manager.
    pub engine: Option<EngineLink>,
}

impl<P: ?Sized + Participant> ManagerCore<P> {
    /// Take ownership of `player` and bind it to this manager.
    pub fn new(player: Box<P>, player_id: PlayerId, configuration: Configuration) -> Self {
        let link = ManagerLink::new(player_id, configuration.get("name").map(str::to_string));
        debug!("Manager for player {} constructed, binding {}.", player_id, player.name());
        player.bind(link);
        Self {
            player,
            player_id,
            configuration,
            engine: None,
        }
    }
}

/// The controller side of a player.
///
/// Games implement this on their own manager type, usually by wrapping a
/// [`ManagerCore`] and adding game-specific state. The hook methods forward
/// to the participant by default.
pub trait PlayerManager: 'static {
    /// Base participant type of the game.
    type Player: ?Sized + Participant;

    /// Capability interface the participant plays against.
    ///
    /// Only checked against the registered exports when a game loads.
    /// Participants are always bound to a plain [`ManagerLink`]; a game
    /// hands its interface to the player as a call argument (Gomoku passes
    /// a `dyn BoardView` to every step).
    type Interface: ?Sized + 'static;

    /// Build a manager around a freshly constructed participant.
    fn from_parts(player: Box<Self::Player>, player_id: PlayerId, configuration: Configuration) -> Self
    where
        Self: Sized;

    /// Shared manager state.
    fn core(&self) -> &ManagerCore<Self::Player>;

    /// Shared manager state, mutably.
    fn core_mut(&mut self) -> &mut ManagerCore<Self::Player>;

    /// Called by the engine when it takes ownership.
    fn attach(&mut self, engine: EngineLink) {
        self.core_mut().engine = Some(engine);
    }

    /// The engine this manager belongs to, once attached.
    fn engine(&self) -> Option<&EngineLink> {
        self.core().engine.as_ref()
    }

    /// Globally unique id of the managed player.
    fn player_id(&self) -> PlayerId {
        self.core().player_id
    }

    /// Name of the managed player.
    fn player_name(&self) -> String {
        self.core().player.name()
    }

    /// `<id>:<name>`, used in log lines.
    fn player_identity(&self) -> String {
        format!("{}:{}", self.player_id(), self.player_name())
    }

    /// Reset the managed player (and the manager itself).
    fn reset_player(&mut self) -> bool {
        debug!("Resetting player {}.", self.player_id());
        self.core_mut().player.reset()
    }

    /// Initialise the managed player.
    fn initialise_player(&mut self) -> bool {
        debug!("Initialising player {}.", self.player_id());
        self.core_mut().player.initialise()
    }

    /// Finalise the managed player.
    fn finalise_player(&mut self) -> bool {
        debug!("Finalising player {}.", self.player_id());
        self.core_mut().player.finalise()
    }
}
