//! WebSocket wire protocol.
//!
//! Both directions are JSON objects tagged `{"action": ..., "data": ...}`.

use actix::prelude::*;
use serde::{Serialize, Deserialize};

use crate::game::board::{Board, Symbol};
use crate::game::state::{MatchResult, MatchView};
use crate::server::matchmaking::types::{MatchId, Stake, WalletAddress};

// Message client -> serveur
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action", content = "data")]
pub enum ClientWsMessage {
    FindMatch {
        player_address: WalletAddress,
        stake: Stake,
    },
    Move {
        match_id: MatchId,
        cell_index: usize,
    },
    Ping,
}

// Message serveur -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data")]
pub enum ServerWsMessage {
    Waiting {
        message: String,
    },
    MatchFound(MatchView),
    BoardUpdated {
        board: Board,
        turn: Symbol,
    },
    MatchCompleted {
        result: MatchResult,
        winner_address: Option<WalletAddress>,
    },
    Error {
        code: String,
        message: String,
        context: Option<String>,
    },
}

impl ServerWsMessage {
    pub fn waiting(message: impl Into<String>) -> Self {
        Self::Waiting { message: message.into() }
    }
    pub fn error(code: &str, message: &str, context: Option<&str>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
            context: context.map(str::to_string),
        }
    }
}
