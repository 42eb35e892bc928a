//! Scripted opponent: picks a uniformly random empty cell.

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::game::board::{self, Board};

/// Choose the scripted opponent's next cell, or `None` on a full board.
pub fn choose_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board::empty_cells(board).choose(rng)
}
