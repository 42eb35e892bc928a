//! Board engine: pure evaluation of a 3x3 tic-tac-toe grid.
//!
//! Cells are stored row-major (index 0 is the top-left corner, 8 the
//! bottom-right). Nothing here holds state; callers own the board.

use serde::{Deserialize, Serialize};

use crate::config::game::BOARD_CELLS;

/// Mark placed by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The symbol that moves after this one.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// A board cell: empty or holding a symbol. Serialized as `null`, `"X"` or `"O"`.
pub type Cell = Option<Symbol>;

/// Fixed-size board.
pub type Board = [Cell; BOARD_CELLS];

/// The 8 winning triples, checked in this order: rows, columns, diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// An empty board.
pub fn empty_board() -> Board {
    [None; BOARD_CELLS]
}

/// Return the symbol of the first complete line, if any.
pub fn evaluate(board: &Board) -> Option<Symbol> {
    WINNING_LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(symbol) if board[b] == Some(symbol) && board[c] == Some(symbol) => Some(symbol),
        _ => None,
    })
}

/// True when no empty cell remains.
pub fn is_full(board: &Board) -> bool {
    board.iter().all(Option::is_some)
}

/// Indices of the empty cells, in ascending order.
pub fn empty_cells(board: &Board) -> impl Iterator<Item = usize> + '_ {
    board
        .iter()
        .enumerate()
        .filter_map(|(idx, cell)| cell.is_none().then_some(idx))
}

/// Number of occupied cells.
pub fn occupied(board: &Board) -> usize {
    board.iter().filter(|cell| cell.is_some()).count()
}
