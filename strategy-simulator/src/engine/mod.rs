//! Game engine lifecycle.
//!
//! - `state`   - lifecycle states and the transition table
//! - `player`  - participants and the manager link they are bound to
//! - `manager` - player managers
//! - `logic`   - the rules hooks and the engine that drives them

pub mod logic;
pub mod manager;
pub mod player;
pub mod state;

pub use logic::{GameLogic, Rules, Seats, Simulation};
pub use manager::{EngineLink, ManagerCore, PlayerManager};
pub use player::{Binding, ManagerLink, Participant, PlayerId};
pub use state::{Phase, State, TransitionError};
