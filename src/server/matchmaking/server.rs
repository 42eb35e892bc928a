/// Matchmaking server actor.
///
/// Owns the single waiting slot. Pairs an arrival with the waiting entry when
/// stakes match, otherwise parks the arrival with a deadline after which it is
/// seated against the scripted opponent. The actor mailbox makes every slot
/// update atomic with respect to concurrent arrivals, deadlines and cancels.

use actix::prelude::*;
use std::time::Instant;
use uuid::Uuid;
use log::{info, debug};

use super::types::{
    Connection, ConnectionId, MatchId, Participant, QueueSnapshot, Stake, WalletAddress,
};
use crate::config::MatchTimings;
use crate::server::game_session::messages::{CreateMatch, Opponent};
use crate::server::game_session::server::GameSessionManager;
use crate::server::messages::ServerWsMessage;

/// The participant currently holding the waiting slot.
struct WaitingEntry {
    /// Distinguishes this entry from any later one held by the same connection.
    entry_id: Uuid,
    participant: Participant,
    stake: Stake,
    deadline: SpawnHandle,
    queued_at: Instant,
}

/// What happened to a `RequestMatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRequestOutcome {
    /// Paired with the waiting entry; the match has been handed to the session manager.
    Paired(MatchId),
    /// The arrival now holds the waiting slot.
    Waiting,
    /// The slot is held by someone else with an incompatible request; nothing was queued.
    Held,
}

/// Main matchmaking server actor.
pub struct MatchmakingServer {
    waiting: Option<WaitingEntry>,
    /// Address of the game session manager for launching matches.
    game_session_manager: Addr<GameSessionManager>,
    timings: MatchTimings,
}

impl MatchmakingServer {
    /// Create a new matchmaking server.
    pub fn new(game_session_manager: Addr<GameSessionManager>, timings: MatchTimings) -> Self {
        Self {
            waiting: None,
            game_session_manager,
            timings,
        }
    }

    /// Hand a new match to the session manager. The session notifies both seats.
    fn launch_match(&self, x: Participant, opponent: Opponent, stake: Stake) -> MatchId {
        let match_id = Uuid::new_v4();
        info!(
            "[Matchmaking] Match {} created: {} vs {} for stake {}",
            match_id,
            x.address,
            match &opponent {
                Opponent::Human(p) => p.address.as_str(),
                Opponent::Scripted => "scripted opponent",
            },
            stake
        );
        self.game_session_manager.do_send(CreateMatch { match_id, x, opponent, stake });
        match_id
    }

    /// Deadline callback. Only acts if `entry_id` still holds the slot.
    fn expire_waiting(&mut self, entry_id: Uuid) {
        let Some(entry) = self.waiting.take_if(|w| w.entry_id == entry_id) else {
            debug!("[Matchmaking] Stale deadline for entry {} ignored", entry_id);
            return;
        };
        info!(
            "[Matchmaking] No opponent for {} after {}s, seating against the scripted opponent",
            entry.participant.address,
            entry.queued_at.elapsed().as_secs()
        );
        self.launch_match(entry.participant, Opponent::Scripted, entry.stake);
    }

    fn snapshot(&self) -> Option<QueueSnapshot> {
        self.waiting.as_ref().map(|w| QueueSnapshot {
            entry_id: w.entry_id,
            connection_id: w.participant.connection.id,
            player_address: w.participant.address.clone(),
            stake: w.stake,
            waited_secs: w.queued_at.elapsed().as_secs(),
        })
    }
}

/// Message: a connection asks to be paired.
#[derive(Message)]
#[rtype(result = "MatchRequestOutcome")]
pub struct RequestMatch {
    pub connection: Connection,
    pub player_address: WalletAddress,
    pub stake: Stake,
}

/// Message: drop the waiting entry owned by this connection, if any.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct CancelWaiting {
    pub connection_id: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "Option<QueueSnapshot>")]
pub struct GetQueueStatus;

impl Actor for MatchmakingServer {
    type Context = Context<Self>;
}

impl Handler<RequestMatch> for MatchmakingServer {
    type Result = MessageResult<RequestMatch>;

    fn handle(&mut self, msg: RequestMatch, ctx: &mut Self::Context) -> Self::Result {
        if let Some(waiting) = &self.waiting {
            if waiting.participant.connection.id == msg.connection.id {
                debug!("[Matchmaking] Connection {} is already waiting", msg.connection.id);
                msg.connection.notify(ServerWsMessage::waiting("Searching for an opponent..."));
                return MessageResult(MatchRequestOutcome::Waiting);
            }

            // Equal stakes pair, but never an address with itself.
            let same_address = waiting.participant.address == msg.player_address;
            if same_address || waiting.stake != msg.stake {
                debug!(
                    "[Matchmaking] {} (stake {}) held: slot taken by {} with stake {}",
                    msg.player_address, msg.stake, waiting.participant.address, waiting.stake
                );
                let notice = if same_address {
                    "This address is already searching on another connection...".to_string()
                } else {
                    format!("Waiting for a player with a {} stake...", waiting.stake)
                };
                msg.connection.notify(ServerWsMessage::waiting(notice));
                return MessageResult(MatchRequestOutcome::Held);
            }

            // Claim the slot and cancel its deadline in the same handler.
            if let Some(entry) = self.waiting.take() {
                ctx.cancel_future(entry.deadline);
                let arrival = Participant {
                    address: msg.player_address,
                    connection: msg.connection,
                };
                let match_id =
                    self.launch_match(entry.participant, Opponent::Human(arrival), entry.stake);
                return MessageResult(MatchRequestOutcome::Paired(match_id));
            }
        }

        let entry_id = Uuid::new_v4();
        let deadline = ctx.run_later(self.timings.queue_timeout, move |act, _ctx| {
            act.expire_waiting(entry_id);
        });
        msg.connection.notify(ServerWsMessage::waiting("Searching for an opponent..."));
        info!(
            "[Matchmaking] {} is waiting for a match with stake {}",
            msg.player_address, msg.stake
        );
        self.waiting = Some(WaitingEntry {
            entry_id,
            participant: Participant {
                address: msg.player_address,
                connection: msg.connection,
            },
            stake: msg.stake,
            deadline,
            queued_at: Instant::now(),
        });
        MessageResult(MatchRequestOutcome::Waiting)
    }
}

impl Handler<CancelWaiting> for MatchmakingServer {
    type Result = bool;

    fn handle(&mut self, msg: CancelWaiting, ctx: &mut Self::Context) -> Self::Result {
        match self.waiting.take_if(|w| w.participant.connection.id == msg.connection_id) {
            Some(entry) => {
                ctx.cancel_future(entry.deadline);
                info!("[Matchmaking] {} left the queue", entry.participant.address);
                true
            }
            None => false,
        }
    }
}

impl Handler<GetQueueStatus> for MatchmakingServer {
    type Result = MessageResult<GetQueueStatus>;

    fn handle(&mut self, _: GetQueueStatus, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.snapshot())
    }
}
