use actix::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use actix::MessageResult;
use log::{debug, info, warn};

use crate::config::MatchTimings;
use crate::game::board::Symbol;
use crate::game::opponent;
use crate::game::state::{MatchResult, MatchState, MoveOutcome, Player, PlayerKind};
use crate::server::game_session::messages::{
    ApplyMove, CreateMatch, Detach, DetachConnection, EvictMatch, GetMatchSession, GetMatchView,
    ListMatches, MatchCompletedEvent, MatchFinished, Opponent, RouteMove, SubscribeCompletions,
};
use crate::server::matchmaking::types::{Connection, ConnectionId, MatchId};
use crate::server::messages::ServerWsMessage;
use crate::server::settlement::Settlement;

/// One running match. The actor mailbox serializes every read and write of
/// its `MatchState`.
pub struct GameSession {
    state: MatchState,
    connections: HashMap<ConnectionId, Connection>,
    manager: Addr<GameSessionManager>,
    timings: MatchTimings,

    scripted_move: Option<SpawnHandle>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.broadcast(ServerWsMessage::MatchFound(self.state.view()));
        self.schedule_scripted_move(ctx);
    }
}

impl GameSession {
    pub fn new(
        state: MatchState,
        connections: Vec<Connection>,
        manager: Addr<GameSessionManager>,
        timings: MatchTimings,
    ) -> Self {
        Self {
            state,
            connections: connections.into_iter().map(|c| (c.id, c)).collect(),
            manager,
            timings,
            scripted_move: None,
        }
    }

    fn broadcast(&self, msg: ServerWsMessage) {
        for connection in self.connections.values() {
            connection.notify(msg.clone());
        }
    }

    /// Apply a move for `symbol`, then notify and run the post-transition hooks.
    fn play(&mut self, symbol: Symbol, cell_index: usize, ctx: &mut Context<Self>) {
        let Some(outcome) = self.state.apply_move(symbol, cell_index) else {
            debug!(
                "[GameSession] Ignored move: match_id={} symbol={:?} cell={} turn={:?} status={:?}",
                self.state.match_id, symbol, cell_index, self.state.turn, self.state.status
            );
            return;
        };

        match outcome {
            MoveOutcome::Continue { turn } => {
                self.broadcast(ServerWsMessage::BoardUpdated { board: self.state.board, turn });
                self.schedule_scripted_move(ctx);
            }
            MoveOutcome::Completed(result) => self.complete(result, ctx),
        }
    }

    /// Queue the scripted opponent's move if it is now its turn.
    fn schedule_scripted_move(&mut self, ctx: &mut Context<Self>) {
        if self.state.scripted_turn().is_none() || self.scripted_move.is_some() {
            return;
        }
        let handle = ctx.run_later(self.timings.think_delay, |act, ctx| {
            act.scripted_move = None;
            act.play_scripted_move(ctx);
        });
        self.scripted_move = Some(handle);
    }

    fn play_scripted_move(&mut self, ctx: &mut Context<Self>) {
        // The match may have completed while the timer was pending.
        let Some(symbol) = self.state.scripted_turn() else {
            return;
        };
        let Some(cell) = opponent::choose_move(&self.state.board, &mut rand::rng()) else {
            return;
        };
        debug!(
            "[GameSession] Scripted opponent plays cell {} in match {}",
            cell, self.state.match_id
        );
        self.play(symbol, cell, ctx);
    }

    fn complete(&mut self, result: MatchResult, ctx: &mut Context<Self>) {
        if let Some(handle) = self.scripted_move.take() {
            ctx.cancel_future(handle);
        }

        let winner_address = self.state.winner_address().cloned();
        info!(
            "[GameSession] Match {} completed: result={:?} winner={}",
            self.state.match_id,
            result,
            winner_address.as_deref().unwrap_or("draw")
        );
        self.broadcast(ServerWsMessage::MatchCompleted {
            result,
            winner_address: winner_address.clone(),
        });

        self.manager.do_send(MatchFinished(MatchCompletedEvent {
            match_id: self.state.match_id,
            result,
            winner_address,
            stake: self.state.stake,
            players: self
                .state
                .players
                .iter()
                .filter(|p| p.kind == PlayerKind::Human)
                .map(|p| p.address.clone())
                .collect(),
        }));

        // Late queries still resolve until the retention window closes.
        ctx.run_later(self.timings.retention, |act, ctx| {
            act.manager.do_send(EvictMatch { match_id: act.state.match_id });
            ctx.stop();
        });
    }
}

impl Handler<ApplyMove> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: ApplyMove, ctx: &mut Context<Self>) -> Self::Result {
        // Only the connection seated on the symbol to move may play it.
        let Some(symbol) = self.state.symbol_of(msg.connection_id) else {
            debug!(
                "[GameSession] Connection {} is not seated in match {}",
                msg.connection_id, self.state.match_id
            );
            return;
        };
        self.play(symbol, msg.cell_index, ctx);
    }
}

impl Handler<Detach> for GameSession {
    type Result = bool;

    fn handle(&mut self, msg: Detach, _: &mut Context<Self>) -> Self::Result {
        self.connections.remove(&msg.connection_id);
        let detached = self.state.detach(msg.connection_id);
        if detached {
            info!(
                "[GameSession] Connection {} left match {}; seat kept without a connection",
                msg.connection_id, self.state.match_id
            );
        }
        detached
    }
}

impl Handler<GetMatchView> for GameSession {
    type Result = MessageResult<GetMatchView>;

    fn handle(&mut self, _: GetMatchView, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.state.view())
    }
}

/// Registry of running and recently completed matches.
pub struct GameSessionManager {
    sessions: HashMap<MatchId, Addr<GameSession>>,
    subscribers: Vec<Recipient<MatchCompletedEvent>>,
    settlement: Arc<dyn Settlement>,
    timings: MatchTimings,
}

impl GameSessionManager {
    pub fn new(settlement: Arc<dyn Settlement>, timings: MatchTimings) -> Self {
        Self {
            sessions: HashMap::new(),
            subscribers: Vec::new(),
            settlement,
            timings,
        }
    }

    pub fn create_match(&mut self, msg: CreateMatch, manager: Addr<Self>) {
        let x = Player::human(msg.x.address, Symbol::X, msg.x.connection.id);
        let mut connections = vec![msg.x.connection];
        let o = match msg.opponent {
            Opponent::Human(participant) => {
                connections.push(participant.connection.clone());
                Player::human(participant.address, Symbol::O, participant.connection.id)
            }
            Opponent::Scripted => Player::scripted(Symbol::O),
        };

        let state = MatchState::new(msg.match_id, x, o, msg.stake);
        let session = GameSession::new(state, connections, manager, self.timings).start();
        self.sessions.insert(msg.match_id, session);
        info!(
            "[GameSessionManager] Match {} registered ({} live)",
            msg.match_id,
            self.sessions.len()
        );
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl Handler<CreateMatch> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: CreateMatch, ctx: &mut Context<Self>) -> Self::Result {
        if self.sessions.contains_key(&msg.match_id) {
            warn!("[GameSessionManager] Duplicate match id {}", msg.match_id);
            return;
        }
        self.create_match(msg, ctx.address());
    }
}

impl Handler<RouteMove> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: RouteMove, _: &mut Context<Self>) -> Self::Result {
        match self.sessions.get(&msg.match_id) {
            Some(session) => session.do_send(ApplyMove {
                connection_id: msg.connection_id,
                cell_index: msg.cell_index,
            }),
            None => debug!("[GameSessionManager] Move for unknown match {}", msg.match_id),
        }
    }
}

impl Handler<DetachConnection> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: DetachConnection, _: &mut Context<Self>) -> Self::Result {
        if let Some(session) = self.sessions.get(&msg.match_id) {
            session.do_send(Detach { connection_id: msg.connection_id });
        }
    }
}

impl Handler<GetMatchSession> for GameSessionManager {
    type Result = MessageResult<GetMatchSession>;

    fn handle(&mut self, msg: GetMatchSession, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.sessions.get(&msg.match_id).cloned())
    }
}

impl Handler<ListMatches> for GameSessionManager {
    type Result = MessageResult<ListMatches>;

    fn handle(&mut self, _: ListMatches, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.sessions.keys().copied().collect())
    }
}

impl Handler<EvictMatch> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: EvictMatch, _: &mut Context<Self>) -> Self::Result {
        if self.sessions.remove(&msg.match_id).is_some() {
            debug!(
                "[GameSessionManager] Match {} evicted ({} live)",
                msg.match_id,
                self.sessions.len()
            );
        }
    }
}

impl Handler<MatchFinished> for GameSessionManager {
    type Result = ();

    fn handle(
        &mut self,
        MatchFinished(event): MatchFinished,
        _: &mut Context<Self>,
    ) -> Self::Result {
        // Scripted wins and draws authorize no payout.
        if let Some(winner) = &event.winner_address {
            if event.players.contains(winner) {
                self.settlement.on_match_completed(event.match_id, winner, event.stake);
            }
        }
        for subscriber in &self.subscribers {
            subscriber.do_send(event.clone());
        }
    }
}

impl Handler<SubscribeCompletions> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: SubscribeCompletions, _: &mut Context<Self>) -> Self::Result {
        self.subscribers.push(msg.0);
    }
}
