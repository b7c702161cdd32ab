//! Lifecycle States
//!
//! The engine moves through a fixed set of states. Every transition goes
//! through one of the four wrapper operations on [`Simulation`]; calling a
//! wrapper from a state that does not permit it is an [`TransitionError`].
//!
//! ```text
//! UNSTABLE ──reset──► RESET ──initialise──► INITIALISED ──step──► STARTED ◄─┐
//!                                               │                   │  │    │
//!                                               │ step = false      │  └────┘ step = true
//!                                               ▼                   │
//!                                           FINISHED ◄──────────────┘ step = false
//!                                               │
//!                                           finalise
//!                                               ▼
//!                                           FINALISED
//! ```
//!
//! A failed reset, initialise or finalise lands in `UNSTABLE`.
//! `reset` is legal from every state except `RESET` itself.
//!
//! [`Simulation`]: super::Simulation

use std::fmt;

/// Engine lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Something went wrong, or nothing happened yet. Only reset is allowed.
    #[default]
    Unstable,
    /// Reset succeeded. Only initialise (or nothing) may follow.
    Reset,
    /// Initialise succeeded; no step has been taken yet.
    Initialised,
    /// At least one step asked to continue.
    Started,
    /// The last step asked to stop.
    Finished,
    /// Finalise succeeded.
    Finalised,
}

impl State {
    /// All states, in lifecycle order.
    pub const ALL: [State; 6] = [
        State::Unstable,
        State::Reset,
        State::Initialised,
        State::Started,
        State::Finished,
        State::Finalised,
    ];

    /// Check if `phase` may run in this state.
    pub fn permits(self, phase: Phase) -> bool {
        match phase {
            Phase::Reset => self != State::Reset,
            Phase::Initialise => self == State::Reset,
            Phase::Step => matches!(self, State::Initialised | State::Started),
            Phase::Finalise => self == State::Finished,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Unstable => "UNSTABLE",
            State::Reset => "RESET",
            State::Initialised => "INITIALISED",
            State::Started => "STARTED",
            State::Finished => "FINISHED",
            State::Finalised => "FINALISED",
        };
        f.write_str(name)
    }
}

/// Lifecycle operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Return the game to its new-born state.
    Reset,
    /// Prepare the game environment.
    Initialise,
    /// Play one round.
    Step,
    /// Tear the game down after it finished.
    Finalise,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Reset => "reset",
            Phase::Initialise => "initialise",
            Phase::Step => "step",
            Phase::Finalise => "finalise",
        };
        f.write_str(name)
    }
}

/// State machine misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The operation is not legal in the current state.
    #[error("Cannot {phase} the game in {state} state")]
    InvalidTransition {
        /// Operation that was attempted.
        phase: Phase,
        /// State the engine was in (and still is).
        state: State,
    },
}
