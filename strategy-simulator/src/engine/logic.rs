//! Game Logic State Machine
//!
//! [`GameLogic`] drives a game's [`Rules`] and its managers through the
//! lifecycle. Games only supply the hooks; the wrappers here own the state,
//! the round counter and the order in which managers are visited.
//!
//! Reset, initialise and finalise share one protocol:
//!
//! 1. run the rules hook;
//! 2. only if it succeeded, run the matching manager hook for every seat in
//!    order, stopping at the first manager that fails;
//! 3. run the rules "after" hook regardless, and AND it into the result.
//!
//! Stepping is different: the engine bumps the round, asks the rules to
//! play it and reads the answer as "keep going" or "stop". Managers are
//! never stepped by the engine itself.

use std::any::Any;
use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::Configuration;
use crate::engine::manager::{EngineLink, PlayerManager};
use crate::engine::state::{Phase, State, TransitionError};

// =============================================================================
// RULES
// =============================================================================

/// Everything a rules hook may touch besides the rules themselves.
pub struct Seats<'a, M> {
    configuration: &'a Configuration,
    managers: &'a mut BTreeMap<usize, M>,
    round: u32,
}

impl<'a, M: PlayerManager> Seats<'a, M> {
    /// The whole game configuration.
    pub fn configuration(&self) -> &Configuration {
        self.configuration
    }

    /// The current (or last completed) round, 0 before the first step.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    /// Check if nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Manager in `seat` (1-based).
    pub fn get(&self, seat: usize) -> Option<&M> {
        self.managers.get(&seat)
    }

    /// Manager in `seat` (1-based), mutably.
    pub fn get_mut(&mut self, seat: usize) -> Option<&mut M> {
        self.managers.get_mut(&seat)
    }

    /// Seats in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &M)> {
        self.managers.iter().map(|(seat, m)| (*seat, m))
    }

    /// Seats in order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut M)> {
        self.managers.iter_mut().map(|(seat, m)| (*seat, m))
    }
}

/// Game-specific hooks.
///
/// Every hook returns `true` on success. A game that wants to run again
/// after a failure gets another `reset` call; nothing is retried
/// automatically.
pub trait Rules: Sized + 'static {
    /// Manager type of the game.
    type Manager: PlayerManager;

    /// Build the rules. Keep this light; prefer doing the work in `reset`.
    fn new(configuration: &Configuration) -> Self;

    /// Name of the game.
    fn name(&self) -> &str;

    /// Put the game environment back into its new-born state.
    fn reset(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Runs after `reset` and the managers' resets, even if they failed.
    fn reset_after(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Prepare the game environment for the simulation.
    fn initialise(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Runs after `initialise` and the managers' initialisations.
    fn initialise_after(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Play the current round, stepping whichever managers the game needs.
    ///
    /// Returns true if the simulation has to continue. The value says
    /// nothing about success.
    fn step_game(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Finalise the game environment once the game is over.
    fn finalise(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;

    /// Runs after `finalise` and the managers' finalisations.
    fn finalise_after(&mut self, seats: &mut Seats<'_, Self::Manager>) -> bool;
}

// =============================================================================
// SIMULATION
// =============================================================================

/// Type-erased view of a loaded game, as the host sees it.
pub trait Simulation {
    /// Name of the game.
    fn name(&self) -> &str;

    /// Current lifecycle state.
    fn state(&self) -> State;

    /// Number of step attempts so far.
    fn round(&self) -> u32;

    /// Number of seated players.
    fn player_count(&self) -> usize;

    /// Identity strings of the seated players, in seat order.
    fn player_identities(&self) -> Vec<String>;

    /// Reset the game and its players.
    fn reset_wrapper(&mut self) -> Result<bool, TransitionError>;

    /// Initialise the game and its players.
    fn initialise_wrapper(&mut self) -> Result<bool, TransitionError>;

    /// Play one round. `Ok(true)` means the simulation continues.
    fn step_wrapper(&mut self) -> Result<bool, TransitionError>;

    /// Finalise the game and its players.
    fn finalise_wrapper(&mut self) -> Result<bool, TransitionError>;

    /// Access to the concrete engine, for inspection.
    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// GAME LOGIC
// =============================================================================

#[derive(Clone, Copy)]
enum Stage {
    Reset,
    Initialise,
    Finalise,
}

impl Stage {
    fn phase(self) -> Phase {
        match self {
            Stage::Reset => Phase::Reset,
            Stage::Initialise => Phase::Initialise,
            Stage::Finalise => Phase::Finalise,
        }
    }

    fn target(self) -> State {
        match self {
            Stage::Reset => State::Reset,
            Stage::Initialise => State::Initialised,
            Stage::Finalise => State::Finalised,
        }
    }
}

/// A game engine: rules plus seated managers plus lifecycle state.
pub struct GameLogic<R: Rules> {
    rules: R,
    managers: BTreeMap<usize, R::Manager>,
    configuration: Configuration,
    state: State,
    round: u32,
}

impl<R: Rules> GameLogic<R> {
    /// Seat `managers` from 1 in the given order and build the rules.
    pub fn new(configuration: Configuration, managers: Vec<R::Manager>) -> Self {
        let rules = R::new(&configuration);
        let seats = managers.len();
        let managers: BTreeMap<usize, R::Manager> = managers
            .into_iter()
            .enumerate()
            .map(|(index, mut manager)| {
                let seat = index + 1;
                manager.attach(EngineLink {
                    game_name: rules.name().to_string(),
                    seat,
                    seats,
                });
                (seat, manager)
            })
            .collect();
        debug!("{} constructed with {} seated managers.", rules.name(), seats);

        Self {
            rules,
            managers,
            configuration,
            state: State::Unstable,
            round: 0,
        }
    }

    /// The game's rules.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// The manager in `seat` (1-based).
    pub fn manager(&self, seat: usize) -> Option<&R::Manager> {
        self.managers.get(&seat)
    }

    /// The configuration the game was built with.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn ensure(&self, phase: Phase) -> Result<(), TransitionError> {
        if self.state.permits(phase) {
            Ok(())
        } else {
            warn!("Trying to {} {} in {} state.", phase, self.rules.name(), self.state);
            Err(TransitionError::InvalidTransition {
                phase,
                state: self.state,
            })
        }
    }

    fn run_stage(&mut self, stage: Stage) -> bool {
        let Self {
            rules,
            managers,
            configuration,
            round,
            ..
        } = self;
        let mut seats = Seats {
            configuration: &*configuration,
            managers,
            round: *round,
        };

        let mut result = match stage {
            Stage::Reset => rules.reset(&mut seats),
            Stage::Initialise => rules.initialise(&mut seats),
            Stage::Finalise => rules.finalise(&mut seats),
        };

        if result {
            for manager in seats.managers.values_mut() {
                let ok = match stage {
                    Stage::Reset => manager.reset_player(),
                    Stage::Initialise => manager.initialise_player(),
                    Stage::Finalise => manager.finalise_player(),
                };
                if ok {
                    debug!("Successful {} of {}.", stage.phase(), manager.player_identity());
                } else {
                    debug!("Could not {} {}.", stage.phase(), manager.player_identity());
                    result = false;
                    break;
                }
            }
        }

        let after = match stage {
            Stage::Reset => rules.reset_after(&mut seats),
            Stage::Initialise => rules.initialise_after(&mut seats),
            Stage::Finalise => rules.finalise_after(&mut seats),
        };
        result && after
    }

    fn transition(&mut self, stage: Stage) -> Result<bool, TransitionError> {
        self.ensure(stage.phase())?;

        let result = self.run_stage(stage);
        if result {
            self.state = stage.target();
            trace!("{} is {}.", self.rules.name(), self.state);
        } else {
            self.state = State::Unstable;
            trace!("{} is UNSTABLE, as the {} failed.", self.rules.name(), stage.phase());
        }
        Ok(result)
    }
}

impl<R: Rules> Simulation for GameLogic<R> {
    fn name(&self) -> &str {
        self.rules.name()
    }

    fn state(&self) -> State {
        self.state
    }

    fn round(&self) -> u32 {
        self.round
    }

    fn player_count(&self) -> usize {
        self.managers.len()
    }

    fn player_identities(&self) -> Vec<String> {
        self.managers.values().map(|m| m.player_identity()).collect()
    }

    fn reset_wrapper(&mut self) -> Result<bool, TransitionError> {
        self.transition(Stage::Reset)
    }

    fn initialise_wrapper(&mut self) -> Result<bool, TransitionError> {
        self.transition(Stage::Initialise)
    }

    fn step_wrapper(&mut self) -> Result<bool, TransitionError> {
        self.ensure(Phase::Step)?;

        self.round += 1;
        trace!("Starting round {}.", self.round);

        let started = Instant::now();
        let proceed = {
            let Self {
                rules,
                managers,
                configuration,
                round,
                ..
            } = self;
            let mut seats = Seats {
                configuration: &*configuration,
                managers,
                round: *round,
            };
            rules.step_game(&mut seats)
        };
        trace!("Round {} finished in {} ms.", self.round, started.elapsed().as_millis());

        if proceed {
            if self.state != State::Started {
                self.state = State::Started;
                trace!("{} is STARTED, we had our first step.", self.rules.name());
            }
        } else {
            self.state = State::Finished;
            trace!("{} is FINISHED, the last step returned false.", self.rules.name());
        }
        Ok(proceed)
    }

    fn finalise_wrapper(&mut self) -> Result<bool, TransitionError> {
        self.transition(Stage::Finalise)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
