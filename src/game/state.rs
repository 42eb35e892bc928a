//! Match state machine.
//!
//! `MatchState` owns one match's players, board, turn and outcome. It is a
//! plain value: the `GameSession` actor that owns it provides serialization,
//! timers and notifications. Illegal moves return `None` and leave the state
//! untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::game::BOARD_CELLS;
use crate::config::matchmaking::SCRIPTED_PLAYER_ADDRESS;
use crate::game::board::{self, Board, Symbol};
use crate::server::matchmaking::types::{ConnectionId, MatchId, Stake, WalletAddress};

/// Who is behind a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Scripted,
}

/// A seat in a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub address: WalletAddress,
    pub symbol: Symbol,
    pub kind: PlayerKind,
    /// `None` for the scripted opponent or a human who disconnected.
    pub connection: Option<ConnectionId>,
}

impl Player {
    pub fn human(address: WalletAddress, symbol: Symbol, connection: ConnectionId) -> Self {
        Self {
            address,
            symbol,
            kind: PlayerKind::Human,
            connection: Some(connection),
        }
    }

    pub fn scripted(symbol: Symbol) -> Self {
        Self {
            address: SCRIPTED_PLAYER_ADDRESS.to_string(),
            symbol,
            kind: PlayerKind::Scripted,
            connection: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Active,
    Completed,
}

/// Final outcome of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl MatchResult {
    pub fn winner_symbol(self) -> Option<Symbol> {
        match self {
            MatchResult::X => Some(Symbol::X),
            MatchResult::O => Some(Symbol::O),
            MatchResult::Draw => None,
        }
    }
}

impl From<Symbol> for MatchResult {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => MatchResult::X,
            Symbol::O => MatchResult::O,
        }
    }
}

/// What an accepted move did to the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The match goes on; `turn` is the symbol to move next.
    Continue { turn: Symbol },
    /// The move ended the match.
    Completed(MatchResult),
}

/// Public seat description sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub address: WalletAddress,
    pub symbol: Symbol,
    pub kind: PlayerKind,
    /// False once a human seat lost its connection; always false for the scripted seat.
    pub connected: bool,
}

/// Self-consistent snapshot of a match, captured under the owning actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub match_id: MatchId,
    pub players: Vec<PlayerView>,
    pub stake: Stake,
    pub board: Board,
    pub turn: Symbol,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
}

#[derive(Debug, Clone)]
pub struct MatchState {
    pub match_id: MatchId,
    /// `players[0]` holds X, `players[1]` holds O.
    pub players: [Player; 2],
    pub stake: Stake,
    pub board: Board,
    pub turn: Symbol,
    pub status: MatchStatus,
    pub result: Option<MatchResult>,
    /// Accepted moves so far; always equals the number of occupied cells.
    pub moves_played: usize,
}

impl MatchState {
    /// Create an active match. `x` moves first.
    pub fn new(match_id: Uuid, mut x: Player, mut o: Player, stake: Stake) -> Self {
        x.symbol = Symbol::X;
        o.symbol = Symbol::O;
        Self {
            match_id,
            players: [x, o],
            stake,
            board: board::empty_board(),
            turn: Symbol::X,
            status: MatchStatus::Active,
            result: None,
            moves_played: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MatchStatus::Active
    }

    pub fn player(&self, symbol: Symbol) -> &Player {
        match symbol {
            Symbol::X => &self.players[0],
            Symbol::O => &self.players[1],
        }
    }

    /// Symbol owned by the given connection, if it is seated in this match.
    pub fn symbol_of(&self, connection: ConnectionId) -> Option<Symbol> {
        self.players
            .iter()
            .find(|p| p.connection == Some(connection))
            .map(|p| p.symbol)
    }

    /// The scripted opponent's symbol, when the match is active and it is its turn.
    pub fn scripted_turn(&self) -> Option<Symbol> {
        let player = self.player(self.turn);
        (self.is_active() && player.kind == PlayerKind::Scripted).then_some(self.turn)
    }

    /// Apply a move for `symbol` at `cell`.
    ///
    /// Returns `None` without touching the state when the match is over, it is
    /// not `symbol`'s turn, the index is out of range or the cell is taken.
    pub fn apply_move(&mut self, symbol: Symbol, cell: usize) -> Option<MoveOutcome> {
        if !self.is_active() || symbol != self.turn || cell >= BOARD_CELLS {
            return None;
        }
        if self.board[cell].is_some() {
            return None;
        }

        self.board[cell] = Some(symbol);
        self.moves_played += 1;
        debug_assert_eq!(board::occupied(&self.board), self.moves_played);

        if let Some(winner) = board::evaluate(&self.board) {
            return Some(self.complete(MatchResult::from(winner)));
        }
        if board::is_full(&self.board) {
            return Some(self.complete(MatchResult::Draw));
        }

        self.turn = self.turn.opponent();
        Some(MoveOutcome::Continue { turn: self.turn })
    }

    fn complete(&mut self, result: MatchResult) -> MoveOutcome {
        self.status = MatchStatus::Completed;
        self.result = Some(result);
        MoveOutcome::Completed(result)
    }

    /// Address of the winning participant; `None` for a draw or an active match.
    pub fn winner_address(&self) -> Option<&WalletAddress> {
        self.result
            .and_then(MatchResult::winner_symbol)
            .map(|symbol| &self.player(symbol).address)
    }

    /// Drop the connection of a departed human. The seat itself stays.
    pub fn detach(&mut self, connection: ConnectionId) -> bool {
        match self.players.iter_mut().find(|p| p.connection == Some(connection)) {
            Some(player) => {
                player.connection = None;
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> MatchView {
        MatchView {
            match_id: self.match_id,
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    address: p.address.clone(),
                    symbol: p.symbol,
                    kind: p.kind,
                    connected: p.connection.is_some(),
                })
                .collect(),
            stake: self.stake,
            board: self.board,
            turn: self.turn,
            status: self.status,
            result: self.result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human_match() -> (MatchState, ConnectionId, ConnectionId) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let state = MatchState::new(
            Uuid::new_v4(),
            Player::human("0xaaa".into(), Symbol::X, a),
            Player::human("0xbbb".into(), Symbol::O, b),
            10,
        );
        (state, a, b)
    }

    #[test]
    fn test_new_match_starts_with_x() {
        let (state, a, b) = human_match();
        assert_eq!(state.turn, Symbol::X);
        assert!(state.is_active());
        assert_eq!(state.symbol_of(a), Some(Symbol::X));
        assert_eq!(state.symbol_of(b), Some(Symbol::O));
        assert_eq!(state.symbol_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_turn_alternates_and_cells_match_moves() {
        let (mut state, _, _) = human_match();
        let moves = [4, 0, 8, 2, 1, 7];
        for (i, cell) in moves.into_iter().enumerate() {
            let mover = state.turn;
            let expected = if i % 2 == 0 { Symbol::X } else { Symbol::O };
            assert_eq!(mover, expected);
            let outcome = state.apply_move(mover, cell);
            assert_eq!(outcome, Some(MoveOutcome::Continue { turn: mover.opponent() }));
            assert_eq!(board::occupied(&state.board), i + 1);
            assert_eq!(state.moves_played, i + 1);
        }
    }

    #[test]
    fn test_illegal_moves_leave_state_untouched() {
        let (mut state, _, _) = human_match();
        assert_eq!(state.apply_move(Symbol::O, 0), None, "out of turn");
        assert_eq!(state.apply_move(Symbol::X, 9), None, "out of range");
        assert!(state.apply_move(Symbol::X, 0).is_some());
        assert_eq!(state.apply_move(Symbol::O, 0), None, "occupied");
        assert_eq!(state.turn, Symbol::O);
        assert_eq!(state.moves_played, 1);
        assert_eq!(board::occupied(&state.board), 1);
    }

    #[test]
    fn test_row_win_completes_match() {
        let (mut state, _, _) = human_match();
        for (symbol, cell) in [(Symbol::X, 0), (Symbol::O, 3), (Symbol::X, 1), (Symbol::O, 4)] {
            state.apply_move(symbol, cell);
        }
        let outcome = state.apply_move(Symbol::X, 2);
        assert_eq!(outcome, Some(MoveOutcome::Completed(MatchResult::X)));
        assert_eq!(state.status, MatchStatus::Completed);
        assert_eq!(state.winner_address().map(String::as_str), Some("0xaaa"));
    }

    #[test]
    fn test_completed_match_rejects_every_move() {
        let (mut state, _, _) = human_match();
        let moves = [
            (Symbol::X, 0),
            (Symbol::O, 3),
            (Symbol::X, 1),
            (Symbol::O, 4),
            (Symbol::X, 2),
        ];
        for (symbol, cell) in moves {
            state.apply_move(symbol, cell);
        }
        let board_before = state.board;
        for cell in 0..BOARD_CELLS {
            assert_eq!(state.apply_move(Symbol::O, cell), None);
            assert_eq!(state.apply_move(Symbol::X, cell), None);
        }
        assert_eq!(state.board, board_before);
        assert_eq!(state.result, Some(MatchResult::X));
    }

    #[test]
    fn test_full_board_is_a_draw() {
        let (mut state, _, _) = human_match();
        let moves = [4, 0, 8, 2, 1, 7, 6, 3];
        for cell in moves {
            let turn = state.turn;
            assert!(matches!(state.apply_move(turn, cell), Some(MoveOutcome::Continue { .. })));
        }
        assert_eq!(state.apply_move(Symbol::X, 5), Some(MoveOutcome::Completed(MatchResult::Draw)));
        assert_eq!(state.result, Some(MatchResult::Draw));
        assert_eq!(state.winner_address(), None);
    }

    #[test]
    fn test_scripted_turn_and_winner() {
        let human = Uuid::new_v4();
        let mut state = MatchState::new(
            Uuid::new_v4(),
            Player::human("0xaaa".into(), Symbol::X, human),
            Player::scripted(Symbol::O),
            5,
        );
        assert_eq!(state.scripted_turn(), None);
        state.apply_move(Symbol::X, 0);
        assert_eq!(state.scripted_turn(), Some(Symbol::O));

        let moves = [
            (Symbol::O, 3),
            (Symbol::X, 1),
            (Symbol::O, 4),
            (Symbol::X, 8),
            (Symbol::O, 5),
        ];
        for (symbol, cell) in moves {
            state.apply_move(symbol, cell);
        }
        assert_eq!(state.result, Some(MatchResult::O));
        assert_eq!(state.winner_address().map(String::as_str), Some(SCRIPTED_PLAYER_ADDRESS));
        assert_eq!(state.player(Symbol::O).kind, PlayerKind::Scripted);
        assert_eq!(state.scripted_turn(), None);
    }

    #[test]
    fn test_detach_keeps_seat() {
        let (mut state, a, _) = human_match();
        assert!(state.detach(a));
        assert!(!state.detach(a));
        assert_eq!(state.players[0].connection, None);
        assert_eq!(state.players[0].address, "0xaaa");
        assert_eq!(state.symbol_of(a), None);
        let view = state.view();
        assert!(!view.players[0].connected);
        assert!(view.players[1].connected);
    }

    #[test]
    fn test_result_serializes_lowercase_draw() {
        assert_eq!(serde_json::to_string(&MatchResult::Draw).unwrap(), r#""draw""#);
        assert_eq!(serde_json::to_string(&MatchResult::X).unwrap(), r#""X""#);
    }
}
