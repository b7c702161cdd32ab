//! Bundled Empty Game players.

use tracing::info;

use crate::engine::{Binding, Participant};
use crate::games::empty::Player;

/// Announces its id and succeeds.
#[derive(Default)]
pub struct EmptyPlayer {
    binding: Binding,
}

impl Participant for EmptyPlayer {
    fn binding(&self) -> &Binding {
        &self.binding
    }
}

impl Player for EmptyPlayer {
    fn step(&mut self) -> bool {
        match self.manager() {
            Some(link) => info!("It seems that my unique ID is {}.", link.player_id()),
            None => info!("I have no manager yet."),
        }
        true
    }
}
