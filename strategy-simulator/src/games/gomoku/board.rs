//! Gomoku board.
//!
//! Axes are x to the right and y upwards; (0, 0) is the bottom-left cell.

use std::fmt::Write;

/// Character of an empty cell.
pub const EMPTY: char = '.';

/// Stones in a row needed to win.
pub const WINNING_RUN: usize = 5;

/// Largest board area accepted by a reset.
pub const MAX_CELLS: i32 = 1 << 24;

/// Directions checked for a winning run: horizontal, vertical and both diagonals.
const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// A rectangular grid of stones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    cells: Vec<char>,
}

impl Board {
    /// An empty board.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![EMPTY; width as usize * height as usize],
        }
    }

    /// Board width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Board height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Check if (x, y) is on the board.
    pub fn is_valid_coordinate(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.is_valid_coordinate(x, y)
            .then(|| (y * self.width + x) as usize)
    }

    /// Stone at (x, y); off-board cells read as empty.
    pub fn at(&self, x: i32, y: i32) -> char {
        self.index(x, y).map_or(EMPTY, |i| self.cells[i])
    }

    /// Put `stone` on (x, y). Returns false if the cell is off-board or taken.
    pub fn place(&mut self, x: i32, y: i32, stone: char) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i] == EMPTY => {
                self.cells[i] = stone;
                true
            }
            _ => false,
        }
    }

    /// Remove every stone.
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Check if no empty cell is left.
    pub fn is_full(&self) -> bool {
        !self.cells.contains(&EMPTY)
    }

    /// The stone of the first run of five found, if any.
    pub fn winning_stone(&self) -> Option<char> {
        for y in 0..self.height {
            for x in 0..self.width {
                let stone = self.at(x, y);
                if stone == EMPTY {
                    continue;
                }
                for (dx, dy) in DIRECTIONS {
                    // only count runs from their first stone
                    if self.at(x - dx, y - dy) == stone {
                        continue;
                    }
                    let run = (0..)
                        .take_while(|&k| self.at(x + k * dx, y + k * dy) == stone)
                        .count();
                    if run >= WINNING_RUN {
                        return Some(stone);
                    }
                }
            }
        }
        None
    }

    /// Text rendering, top row first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let _ = write!(out, "{} ", self.at(x, y));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_and_read() {
        let mut board = Board::new(5, 6);
        assert!(board.place(4, 5, 'X'));
        assert_eq!(board.at(4, 5), 'X');
        assert!(!board.place(4, 5, 'O'));
        assert!(!board.place(5, 0, 'O'));
        assert!(!board.place(-1, 0, 'O'));
        assert_eq!(board.at(-1, 0), EMPTY);
    }

    #[test]
    fn test_runs_in_every_direction() {
        let lines: [Vec<(i32, i32)>; 4] = [
            (2..7).map(|x| (x, 3)).collect(),
            (1..6).map(|y| (4, y)).collect(),
            (0..5).map(|k| (k + 2, k + 1)).collect(),
            (0..5).map(|k| (k + 1, 6 - k)).collect(),
        ];
        for line in lines {
            let mut board = Board::new(8, 8);
            for (i, (x, y)) in line.iter().enumerate() {
                assert_eq!(board.winning_stone(), None);
                assert!(board.place(*x, *y, 'X'), "{i}");
            }
            assert_eq!(board.winning_stone(), Some('X'));
        }
    }

    #[test]
    fn test_four_is_not_enough() {
        let mut board = Board::new(9, 9);
        for x in 0..4 {
            board.place(x, 0, 'X');
        }
        board.place(4, 0, 'O');
        assert_eq!(board.winning_stone(), None);
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new(5, 5);
        assert!(!board.is_full());
        for y in 0..5 {
            for x in 0..5 {
                board.place(x, y, if (x + 2 * y) % 4 < 2 { 'X' } else { 'O' });
            }
        }
        assert!(board.is_full());
        board.clear();
        assert!(!board.is_full());
        assert_eq!(board.at(0, 0), EMPTY);
    }

    #[test]
    fn test_render_top_row_first() {
        let mut board = Board::new(5, 5);
        board.place(0, 4, 'X');
        let rendered = board.render();
        assert!(rendered.starts_with("X . . . . \n"));
        assert!(rendered.ends_with(". . . . . \n"));
    }
}
