//! Gomoku player manager.

use tracing::{debug, error};

use crate::config::Configuration;
use crate::engine::{ManagerCore, PlayerId, PlayerManager};
use crate::games::gomoku::board::{Board, EMPTY};
use crate::games::gomoku::{BoardView, Player};

/// Board plus the stones of one player.
struct PlayerView<'a> {
    board: &'a Board,
    player_char: char,
    enemy_char: char,
}

impl BoardView for PlayerView<'_> {
    fn player_char(&self) -> char {
        self.player_char
    }

    fn enemy_char(&self) -> char {
        self.enemy_char
    }

    fn empty_char(&self) -> char {
        EMPTY
    }

    fn width(&self) -> i32 {
        self.board.width()
    }

    fn height(&self) -> i32 {
        self.board.height()
    }

    fn at(&self, x: i32, y: i32) -> char {
        self.board.at(x, y)
    }

    fn is_valid_coordinate(&self, x: i32, y: i32) -> bool {
        self.board.is_valid_coordinate(x, y)
    }
}

/// Manages one Gomoku player and its stone.
pub struct GomokuManager {
    core: ManagerCore<dyn Player>,
    player_char: char,
    enemy_char: char,
}

impl GomokuManager {
    /// This player's stone, `' '` until reset.
    pub fn player_char(&self) -> char {
        self.player_char
    }

    /// The opponent's stone, `' '` until the game wires it.
    pub fn enemy_char(&self) -> char {
        self.enemy_char
    }

    pub(crate) fn set_enemy_char(&mut self, enemy_char: char) {
        self.enemy_char = enemy_char;
    }

    /// Ask the player for its next move.
    pub fn step_player(&mut self, board: &Board) -> (i32, i32) {
        debug!("Stepping player {}.", self.player_id());
        let view = PlayerView {
            board,
            player_char: self.player_char,
            enemy_char: self.enemy_char,
        };
        self.core.player.step(&view)
    }
}

impl PlayerManager for GomokuManager {
    type Player = dyn Player;
    type Interface = dyn BoardView;

    fn from_parts(player: Box<dyn Player>, player_id: PlayerId, configuration: Configuration) -> Self {
        Self {
            core: ManagerCore::new(player, player_id, configuration),
            player_char: ' ',
            enemy_char: ' ',
        }
    }

    fn core(&self) -> &ManagerCore<dyn Player> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManagerCore<dyn Player> {
        &mut self.core
    }

    fn player_identity(&self) -> String {
        format!("{}:{}({})", self.player_id(), self.player_name(), self.player_char)
    }

    fn reset_player(&mut self) -> bool {
        match self.core.configuration.get("character").and_then(|c| c.chars().next()) {
            Some(c) => self.player_char = c,
            None => {
                error!("Player {} has no 'character' configured.", self.player_id());
                return false;
            }
        }
        debug!("Resetting player {}.", self.player_id());
        self.core.player.reset()
    }
}
