//! Participants
//!
//! A participant holds the per-turn decision logic of one player. It is
//! built with no arguments and without knowing who manages it; the manager
//! binds itself afterwards through [`Participant::bind`], exactly once and
//! before any lifecycle hook runs.

use std::cell::OnceCell;
use std::fmt;

use tracing::{debug, warn};

/// Globally unique player identifier, assigned from 1 upwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Create from the raw number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The part of a manager every participant may see, whatever the game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerLink {
    player_id: PlayerId,
    display_name: Option<String>,
}

impl ManagerLink {
    /// Create a link for the given player.
    pub fn new(player_id: PlayerId, display_name: Option<String>) -> Self {
        Self {
            player_id,
            display_name,
        }
    }

    /// Your globally unique id.
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// The name the configuration gave you, if any.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Write-once slot for the manager link.
#[derive(Debug, Default)]
pub struct Binding {
    link: OnceCell<ManagerLink>,
}

impl Binding {
    /// Create an unbound slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the link. Returns false (and keeps the first link) when already bound.
    pub fn set(&self, link: ManagerLink) -> bool {
        self.link.set(link).is_ok()
    }

    /// The stored link, if bound.
    pub fn get(&self) -> Option<&ManagerLink> {
        self.link.get()
    }

    /// Check if a link was stored.
    pub fn is_bound(&self) -> bool {
        self.link.get().is_some()
    }
}

/// Base participant behaviour shared by every game.
///
/// Games extend this with their own trait that adds the game-specific
/// `step` operation. The lifecycle hooks default to succeeding.
pub trait Participant: 'static {
    /// The slot holding this participant's manager link.
    fn binding(&self) -> &Binding;

    /// Name of this participant, defaults to the concrete type's name.
    fn name(&self) -> String {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full).to_string()
    }

    /// Late-bind the managing side. Only the first call has any effect.
    fn bind(&self, link: ManagerLink) {
        let player_id = link.player_id();
        if self.binding().set(link) {
            debug!("Stored the manager link for player {}.", player_id);
        } else {
            warn!("Participant {} is already bound, ignoring link for player {}.", self.name(), player_id);
        }
    }

    /// The managing side, once bound.
    fn manager(&self) -> Option<&ManagerLink> {
        self.binding().get()
    }

    /// Return to the new-born state.
    fn reset(&mut self) -> bool {
        debug!("{} reset.", self.name());
        true
    }

    /// Get ready for the simulation.
    fn initialise(&mut self) -> bool {
        debug!("{} initialised.", self.name());
        true
    }

    /// Clean up after the simulation ended.
    fn finalise(&mut self) -> bool {
        debug!("{} finalised.", self.name());
        true
    }
}
