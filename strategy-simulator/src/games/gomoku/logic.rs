//! Gomoku rules.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::config::Configuration;
use crate::engine::{PlayerManager, Rules, Seats};
use crate::games::gomoku::board::{Board, MAX_CELLS, WINNING_RUN};
use crate::games::gomoku::manager::GomokuManager;
use crate::games::gomoku::record::MoveRecord;

const PLAYERS: usize = 2;

/// How a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Still running, or never played.
    Undecided,
    /// The player in this seat won.
    Winner(usize),
    /// The board filled up without a winner.
    Draw,
}

/// Gomoku engine state.
pub struct Gomoku {
    board: Board,
    next_seat: usize,
    outcome: Outcome,
    create_log: bool,
    log_dir: PathBuf,
    record: Option<MoveRecord>,
}

impl Gomoku {
    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Result of the last game.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// The move record being written, if any.
    pub fn record(&self) -> Option<&MoveRecord> {
        self.record.as_ref()
    }

    fn dimension(configuration: &Configuration, key: &str) -> Option<i32> {
        match configuration.get_integer(key) {
            Ok(Some(value)) => i32::try_from(value).ok(),
            Ok(None) => {
                error!("Mandatory game configuration '{}' is missing.", key);
                None
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    fn seat_of(seats: &Seats<'_, GomokuManager>, stone: char) -> Option<usize> {
        seats
            .iter()
            .find(|(_, manager)| manager.player_char() == stone)
            .map(|(seat, _)| seat)
    }

    fn close_record(&mut self) {
        if let Some(record) = self.record.take() {
            let path = record.path().to_path_buf();
            if let Err(e) = record.finish() {
                warn!("Could not finish logfile '{}': {}", path.display(), e);
            }
        }
    }
}

impl Rules for Gomoku {
    type Manager = GomokuManager;

    fn new(_configuration: &Configuration) -> Self {
        debug!("Gomoku constructed.");
        Self {
            board: Board::default(),
            next_seat: 1,
            outcome: Outcome::Undecided,
            create_log: false,
            log_dir: PathBuf::new(),
            record: None,
        }
    }

    fn name(&self) -> &str {
        "Gomoku"
    }

    fn reset(&mut self, seats: &mut Seats<'_, GomokuManager>) -> bool {
        self.close_record();
        self.create_log = false;

        if seats.len() != PLAYERS {
            error!("The Gomoku game should be played by two players!");
            return false;
        }

        let configuration = seats.configuration();
        let (Some(width), Some(height)) = (
            Self::dimension(configuration, "game.width"),
            Self::dimension(configuration, "game.height"),
        ) else {
            return false;
        };
        if width < WINNING_RUN as i32 || height < WINNING_RUN as i32 {
            error!("Please specify a game board at least 5 by 5!");
            return false;
        }
        if width.checked_mul(height).map_or(true, |area| area > MAX_CELLS) {
            error!("A {}x{} board exceeds the limit of {} cells.", width, height, MAX_CELLS);
            return false;
        }
        self.board = Board::new(width, height);

        self.create_log = match configuration.get_boolean("createlog") {
            Ok(value) => value.unwrap_or(false),
            Err(e) => {
                warn!("{}, not creating a logfile.", e);
                false
            }
        };
        self.log_dir = configuration
            .get("game.logdir")
            .map(PathBuf::from)
            .unwrap_or_default();

        debug!("Gomoku was reset, board is {}x{}.", width, height);
        true
    }

    fn reset_after(&mut self, seats: &mut Seats<'_, GomokuManager>) -> bool {
        let (Some(first), Some(second)) = (seats.get(1), seats.get(2)) else {
            return false;
        };
        let (a, b) = (first.player_char(), second.player_char());
        if a == b || a.is_whitespace() || b.is_whitespace() {
            error!("Could not finish resetting Gomoku, as the players have invalid configuration!");
            return false;
        }
        if let Some(manager) = seats.get_mut(1) {
            manager.set_enemy_char(b);
        }
        if let Some(manager) = seats.get_mut(2) {
            manager.set_enemy_char(a);
        }

        if self.create_log {
            match MoveRecord::create(&self.log_dir, self.board.width(), self.board.height()) {
                Ok(record) => {
                    info!("Created logfile '{}'.", record.path().display());
                    self.record = Some(record);
                }
                Err(e) => {
                    warn!("Can not create logfile in '{}': {}", self.log_dir.display(), e);
                    self.create_log = false;
                }
            }
        } else {
            info!("No logfile is created.");
        }
        true
    }

    fn initialise(&mut self, _seats: &mut Seats<'_, GomokuManager>) -> bool {
        self.board.clear();
        self.next_seat = 1;
        self.outcome = Outcome::Undecided;
        debug!("Gomoku was initialised, board is blanked.");
        true
    }

    fn initialise_after(&mut self, _seats: &mut Seats<'_, GomokuManager>) -> bool {
        debug!("Gomoku was initialised after all players.");
        true
    }

    fn step_game(&mut self, seats: &mut Seats<'_, GomokuManager>) -> bool {
        let seat = self.next_seat;
        let other = if seat == 1 { 2 } else { 1 };
        self.next_seat = other;

        let Some(manager) = seats.get_mut(seat) else {
            error!("Nobody sits in seat {}.", seat);
            return false;
        };
        let (x, y) = manager.step_player(&self.board);
        if let Some(record) = self.record.as_mut() {
            if let Err(e) = record.write_move(x, y) {
                warn!("Could not record move: {}", e);
            }
        }

        if self.board.place(x, y, manager.player_char()) {
            debug!(
                "Player {} placed its {} to {},{}.",
                manager.player_identity(),
                manager.player_char(),
                x,
                y
            );
        } else {
            info!(
                "Player {} loses as it wants to put to the invalid coordinate {},{}.",
                manager.player_identity(),
                x,
                y
            );
            self.outcome = Outcome::Winner(other);
            return false;
        }
        debug!("The board looks like this:\n{}", self.board.render());

        if let Some(stone) = self.board.winning_stone() {
            self.outcome = Self::seat_of(seats, stone).map_or(Outcome::Undecided, Outcome::Winner);
            info!("Game ended.");
            false
        } else if self.board.is_full() {
            self.outcome = Outcome::Draw;
            info!("Game ended.");
            false
        } else {
            true
        }
    }

    fn finalise(&mut self, seats: &mut Seats<'_, GomokuManager>) -> bool {
        match self.outcome {
            Outcome::Winner(seat) => {
                if let Some(manager) = seats.get(seat) {
                    info!("{} won the game.", manager.player_identity());
                }
            }
            Outcome::Draw => info!("The game is a draw."),
            Outcome::Undecided => info!("The game ended undecided."),
        }
        self.close_record();
        debug!("Gomoku was finalised.");
        true
    }

    fn finalise_after(&mut self, _seats: &mut Seats<'_, GomokuManager>) -> bool {
        debug!("Gomoku was finalised after all players.");
        true
    }
}
