//! Event gateway.
//!
//! Each connection tracks whether it is idle, queued or seated in a match, and
//! turns validated client intents into a `Route` for the matchmaking server or
//! the match registry. The association is updated from the notifications the
//! connection receives, so it never lags behind what the client was told.

pub mod session;

use log::debug;

use crate::server::matchmaking::server::MatchRequestOutcome;
use crate::server::matchmaking::types::{ConnectionId, MatchId, Stake, WalletAddress};
use crate::server::messages::{ClientWsMessage, ServerWsMessage};

pub const INVALID_INTENT: &str = "INVALID_INTENT";
pub const ALREADY_QUEUED: &str = "ALREADY_QUEUED";
pub const ALREADY_IN_MATCH: &str = "ALREADY_IN_MATCH";

/// What a connection is attached to. Never both a queue entry and a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Association {
    Idle,
    Queued,
    InMatch(MatchId),
}

/// Where a client intent goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    RequestMatch {
        player_address: WalletAddress,
        stake: Stake,
    },
    ApplyMove {
        match_id: MatchId,
        cell_index: usize,
    },
    Reject {
        code: &'static str,
        message: &'static str,
    },
    Ignore,
}

#[derive(Debug)]
pub struct Gateway {
    connection_id: ConnectionId,
    association: Association,
}

impl Gateway {
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            association: Association::Idle,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn association(&self) -> Association {
        self.association
    }

    pub fn route(&self, msg: ClientWsMessage) -> Route {
        match msg {
            ClientWsMessage::FindMatch { player_address, stake } => {
                let player_address = player_address.trim().to_string();
                if player_address.is_empty() || stake == 0 {
                    return Route::Reject {
                        code: INVALID_INTENT,
                        message: "FindMatch requires a player address and a positive stake.",
                    };
                }
                match self.association {
                    Association::Idle => Route::RequestMatch { player_address, stake },
                    Association::Queued => Route::Reject {
                        code: ALREADY_QUEUED,
                        message: "Already searching for an opponent.",
                    },
                    Association::InMatch(_) => Route::Reject {
                        code: ALREADY_IN_MATCH,
                        message: "Finish the current match first.",
                    },
                }
            }
            ClientWsMessage::Move { match_id, cell_index } => match self.association {
                Association::InMatch(current) if current == match_id => {
                    Route::ApplyMove { match_id, cell_index }
                }
                _ => {
                    debug!(
                        "[Gateway] Connection {} sent a move for match {} it is not seated in",
                        self.connection_id, match_id
                    );
                    Route::Ignore
                }
            },
            ClientWsMessage::Ping => Route::Ignore,
        }
    }

    /// Record the matchmaking server's answer to a `RequestMatch`.
    ///
    /// A paired arrival is seated as soon as the pairing is made, before its
    /// `MatchFound` has travelled back through the match registry.
    pub fn record_request_outcome(&mut self, outcome: MatchRequestOutcome) {
        match outcome {
            MatchRequestOutcome::Waiting if self.association == Association::Idle => {
                self.association = Association::Queued;
            }
            MatchRequestOutcome::Paired(match_id)
                if !matches!(self.association, Association::InMatch(_)) =>
            {
                self.association = Association::InMatch(match_id);
            }
            _ => {}
        }
    }

    /// Update the association from an outbound notification.
    pub fn observe(&mut self, msg: &ServerWsMessage) {
        match msg {
            ServerWsMessage::MatchFound(view) => {
                self.association = Association::InMatch(view.match_id)
            }
            ServerWsMessage::MatchCompleted { .. } => self.association = Association::Idle,
            _ => {}
        }
    }
}
