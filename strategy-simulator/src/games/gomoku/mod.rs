//! Gomoku
//!
//! Five in a row for two players on a board of at least 5 by 5.
//!
//! ## Configuration
//!
//! ```text
//! game.width  = 15
//! game.height = 15
//! createlog   = true        # optional move record
//! game.logdir = records     # optional, where the record goes
//! player.1.character = X
//! player.2.character = O
//! ```
//!
//! Players take turns starting with seat 1. A move onto a taken or
//! off-board cell loses immediately.

pub mod board;
pub mod logic;
pub mod manager;
pub mod players;
pub mod record;

pub use board::Board;
pub use logic::{Gomoku, Outcome};
pub use manager::GomokuManager;

use crate::engine::Participant;
use crate::module::PluginRegistry;

/// What a Gomoku player can see of the game.
pub trait BoardView {
    /// Your stone.
    fn player_char(&self) -> char;

    /// Your opponent's stone.
    fn enemy_char(&self) -> char;

    /// Character of an empty cell.
    fn empty_char(&self) -> char;

    /// Board width.
    fn width(&self) -> i32;

    /// Board height.
    fn height(&self) -> i32;

    /// Stone at (x, y); off-board cells read as empty.
    fn at(&self, x: i32, y: i32) -> char;

    /// Check if (x, y) is on the board.
    fn is_valid_coordinate(&self, x: i32, y: i32) -> bool;

    /// The whole board, indexed `[y][x]` with row 0 at the bottom.
    fn rows(&self) -> Vec<Vec<char>> {
        (0..self.height())
            .map(|y| (0..self.width()).map(|x| self.at(x, y)).collect())
            .collect()
    }
}

/// A Gomoku player.
pub trait Player: Participant {
    /// Choose the cell for your next stone.
    fn step(&mut self, view: &dyn BoardView) -> (i32, i32);
}

/// Register the Gomoku exports under `gomoku::*`.
pub fn register(registry: &mut PluginRegistry) {
    registry.register_engine::<Gomoku>("gomoku::engine");
    registry.register_interface::<dyn BoardView>("gomoku::manager_interface");
    registry.register_manager::<GomokuManager>("gomoku::manager");
    registry.register_base::<dyn Player>("gomoku::player");
    registry.register_participant::<dyn Player>("gomoku::players::corner", "CornerPlayer", || {
        Box::new(players::CornerPlayer::default())
    });
    registry.register_participant::<dyn Player>("gomoku::players::sweep", "SweepPlayer", || {
        Box::new(players::SweepPlayer::default())
    });
    registry.register_participant::<dyn Player>("gomoku::players::centre", "CentrePlayer", || {
        Box::new(players::CentrePlayer::default())
    });
}
