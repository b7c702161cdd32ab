//! Bundled Gomoku players.

use crate::engine::{Binding, Participant};
use crate::games::gomoku::{BoardView, Player};

/// Always plays (0, 0), so it loses on its second move.
#[derive(Default)]
pub struct CornerPlayer {
    binding: Binding,
}

impl Participant for CornerPlayer {
    fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl Player for CornerPlayer {
    fn step(&mut self, _view: &dyn BoardView) -> (i32, i32) {
        (0, 0)
    }
}

/// Plays the first empty cell, scanning rows from the bottom.
#[derive(Default)]
pub struct SweepPlayer {
    binding: Binding,
}

impl Participant for SweepPlayer {
    fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl Player for SweepPlayer {
    fn step(&mut self, view: &dyn BoardView) -> (i32, i32) {
        cells(view)
            .find(|&(x, y)| view.at(x, y) == view.empty_char())
            .unwrap_or((0, 0))
    }
}

/// Plays the empty cell closest to the centre of the board.
#[derive(Default)]
pub struct CentrePlayer {
    binding: Binding,
}

impl Participant for CentrePlayer {
    fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl Player for CentrePlayer {
    fn step(&mut self, view: &dyn BoardView) -> (i32, i32) {
        // doubled coordinates keep the centre integral
        let (cx, cy) = (i64::from(view.width()) - 1, i64::from(view.height()) - 1);
        cells(view)
            .filter(|&(x, y)| view.at(x, y) == view.empty_char())
            .min_by_key(|&(x, y)| (2 * i64::from(x) - cx).pow(2) + (2 * i64::from(y) - cy).pow(2))
            .unwrap_or((0, 0))
    }
}

fn cells(view: &dyn BoardView) -> impl Iterator<Item = (i32, i32)> {
    let (width, height) = (view.width(), view.height());
    (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)))
}
