use actix::prelude::*;
use serde::{Serialize, Deserialize};

use super::server::GameSession;
use crate::game::state::{MatchResult, MatchView};
use crate::server::matchmaking::types::{ConnectionId, MatchId, Participant, Stake, WalletAddress};

/// Who takes the O seat of a new match.
#[derive(Debug, Clone)]
pub enum Opponent {
    Human(Participant),
    Scripted,
}

/// Create and start a match. `x` moves first.
#[derive(Message)]
#[rtype(result = "()")]
pub struct CreateMatch {
    pub match_id: MatchId,
    pub x: Participant,
    pub opponent: Opponent,
    pub stake: Stake,
}

/// Move intent as received by the registry, before the match is resolved.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RouteMove {
    pub match_id: MatchId,
    pub connection_id: ConnectionId,
    pub cell_index: usize,
}

/// Move intent delivered to the owning match.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ApplyMove {
    pub connection_id: ConnectionId,
    pub cell_index: usize,
}

/// A connection went away; forget it in the match it was seated in.
#[derive(Message)]
#[rtype(result = "()")]
pub struct DetachConnection {
    pub match_id: MatchId,
    pub connection_id: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "bool")]
pub struct Detach {
    pub connection_id: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "Option<Addr<GameSession>>")]
pub struct GetMatchSession {
    pub match_id: MatchId,
}

#[derive(Message)]
#[rtype(result = "MatchView")]
pub struct GetMatchView;

#[derive(Message)]
#[rtype(result = "Vec<MatchId>")]
pub struct ListMatches;

/// Remove a match from the registry once its retention window is over.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EvictMatch {
    pub match_id: MatchId,
}

/// Emitted exactly once per match when it completes.
#[derive(Message, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[rtype(result = "()")]
pub struct MatchCompletedEvent {
    pub match_id: MatchId,
    pub result: MatchResult,
    pub winner_address: Option<WalletAddress>,
    pub stake: Stake,
    /// Human participants only.
    pub players: Vec<WalletAddress>,
}

/// Session -> manager hand-off of a completion, fanned out from there.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MatchFinished(pub MatchCompletedEvent);

#[derive(Message)]
#[rtype(result = "()")]
pub struct SubscribeCompletions(pub Recipient<MatchCompletedEvent>);
