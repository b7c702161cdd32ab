//! Empty Game
//!
//! A game that does nothing: every hook succeeds, and the only round steps
//! each player once before the game ends. Useful to check that a module
//! loads and that the lifecycle runs end to end.

pub mod players;

use tracing::debug;

use crate::config::Configuration;
use crate::engine::{ManagerCore, ManagerLink, Participant, PlayerId, PlayerManager, Rules, Seats};
use crate::module::PluginRegistry;

/// An Empty Game player.
pub trait Player: Participant {
    /// Take a turn. Returns true on success.
    fn step(&mut self) -> bool;
}

/// Manages one Empty Game player. Players only see the plain manager link.
pub struct EmptyManager {
    core: ManagerCore<dyn Player>,
}

impl EmptyManager {
    /// Step the managed player.
    pub fn step_player(&mut self) -> bool {
        debug!("Stepping player {}.", self.player_id());
        self.core.player.step()
    }
}

impl PlayerManager for EmptyManager {
    type Player = dyn Player;
    type Interface = ManagerLink;

    fn from_parts(player: Box<dyn Player>, player_id: PlayerId, configuration: Configuration) -> Self {
        Self {
            core: ManagerCore::new(player, player_id, configuration),
        }
    }

    fn core(&self) -> &ManagerCore<dyn Player> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManagerCore<dyn Player> {
        &mut self.core
    }
}

/// Rules of the Empty Game.
#[derive(Debug, Default)]
pub struct EmptyGame;

impl Rules for EmptyGame {
    type Manager = EmptyManager;

    fn new(_configuration: &Configuration) -> Self {
        debug!("EmptyGame constructed.");
        EmptyGame
    }

    fn name(&self) -> &str {
        "EmptyGame"
    }

    fn reset(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was reset.");
        true
    }

    fn reset_after(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was reset after all players.");
        true
    }

    fn initialise(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was initialised.");
        true
    }

    fn initialise_after(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was initialised after all players.");
        true
    }

    fn step_game(&mut self, seats: &mut Seats<'_, EmptyManager>) -> bool {
        for (_, manager) in seats.iter_mut() {
            if manager.step_player() {
                debug!("Stepping player {} was successful.", manager.player_identity());
            } else {
                debug!("Stepping player {} failed.", manager.player_identity());
                break;
            }
        }
        // one round is all there is
        false
    }

    fn finalise(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was finalised.");
        true
    }

    fn finalise_after(&mut self, _seats: &mut Seats<'_, EmptyManager>) -> bool {
        debug!("EmptyGame was finalised after all players.");
        true
    }
}

/// Register the Empty Game exports under `empty::*`.
pub fn register(registry: &mut PluginRegistry) {
    registry.register_engine::<EmptyGame>("empty::engine");
    registry.register_interface::<ManagerLink>("empty::manager_interface");
    registry.register_manager::<EmptyManager>("empty::manager");
    registry.register_base::<dyn Player>("empty::player");
    registry.register_participant::<dyn Player>("empty::players::empty", "EmptyPlayer", || {
        Box::new(players::EmptyPlayer::default())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Binding, GameLogic, Simulation, State};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        binding: Binding,
        steps: Rc<Cell<u32>>,
        succeed: bool,
    }

    impl Participant for Counting {
        fn binding(&self) -> &Binding {
            &self.binding
        }
    }

    impl Player for Counting {
        fn step(&mut self) -> bool {
            self.steps.set(self.steps.get() + 1);
            self.succeed
        }
    }

    fn seated(outcomes: &[bool]) -> (GameLogic<EmptyGame>, Vec<Rc<Cell<u32>>>) {
        let counters: Vec<Rc<Cell<u32>>> = outcomes.iter().map(|_| Rc::default()).collect();
        let managers = outcomes
            .iter()
            .zip(&counters)
            .enumerate()
            .map(|(i, (succeed, steps))| {
                let player = Counting {
                    binding: Binding::new(),
                    steps: Rc::clone(steps),
                    succeed: *succeed,
                };
                EmptyManager::from_parts(Box::new(player), PlayerId::new(i as u64 + 1), Configuration::new())
            })
            .collect();
        (GameLogic::new(Configuration::new(), managers), counters)
    }

    #[test]
    fn test_single_round() {
        let (mut logic, counters) = seated(&[true, true]);
        logic.reset_wrapper().unwrap();
        logic.initialise_wrapper().unwrap();
        assert_eq!(logic.step_wrapper(), Ok(false));
        assert_eq!(logic.finalise_wrapper(), Ok(true));
        assert_eq!(logic.state(), State::Finalised);
        assert_eq!(counters[0].get(), 1);
        assert_eq!(counters[1].get(), 1);
    }

    #[test]
    fn test_step_stops_at_failing_player() {
        let (mut logic, counters) = seated(&[true, false, true]);
        logic.reset_wrapper().unwrap();
        logic.initialise_wrapper().unwrap();
        assert_eq!(logic.step_wrapper(), Ok(false));
        assert_eq!(counters[0].get(), 1);
        assert_eq!(counters[1].get(), 1);
        assert_eq!(counters[2].get(), 0);
    }

    #[test]
    fn test_empty_player_steps() {
        let mut manager = EmptyManager::from_parts(
            Box::new(players::EmptyPlayer::default()),
            PlayerId::new(4),
            Configuration::new(),
        );
        assert!(manager.step_player());
        assert_eq!(manager.player_identity(), "4:EmptyPlayer");
    }
}
