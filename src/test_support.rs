//! Helpers shared by the actor tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix::prelude::*;
use uuid::Uuid;

use crate::config::MatchTimings;
use crate::server::matchmaking::types::{Connection, MatchId, Participant, Stake, WalletAddress};
use crate::server::messages::ServerWsMessage;
use crate::server::settlement::Settlement;

/// Test actor that stores every message it receives.
pub struct Collector<M> {
    inbox: Arc<Mutex<Vec<M>>>,
}

impl<M: 'static> Actor for Collector<M> {
    type Context = Context<Self>;
}

impl<M> Handler<M> for Collector<M>
where
    M: Message<Result = ()> + Send + 'static,
{
    type Result = ();

    fn handle(&mut self, msg: M, _: &mut Context<Self>) -> Self::Result {
        self.inbox.lock().unwrap().push(msg);
    }
}

/// Read side of a `Collector`.
#[derive(Clone)]
pub struct Inbox<M> {
    messages: Arc<Mutex<Vec<M>>>,
}

impl<M: Clone> Inbox<M> {
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().unwrap().clone()
    }
}

pub fn collector<M>() -> (Recipient<M>, Inbox<M>)
where
    M: Message<Result = ()> + Send + 'static,
{
    let messages = Arc::new(Mutex::new(Vec::new()));
    let addr = Collector { inbox: messages.clone() }.start();
    (addr.recipient(), Inbox { messages })
}

/// A fake client connection and the notifications it receives.
pub fn connection() -> (Connection, Inbox<ServerWsMessage>) {
    let (addr, inbox) = collector::<ServerWsMessage>();
    (Connection::new(Uuid::new_v4(), addr), inbox)
}

pub fn participant(address: &str) -> (Participant, Inbox<ServerWsMessage>) {
    let (connection, inbox) = connection();
    (Participant { address: address.to_string(), connection }, inbox)
}

/// Short timers so tests can watch deadlines fire.
pub fn fast_timings() -> MatchTimings {
    MatchTimings {
        queue_timeout: Duration::from_millis(40),
        think_delay: Duration::from_millis(20),
        retention: Duration::from_millis(60),
    }
}

pub async fn sleep_ms(ms: u64) {
    actix::clock::sleep(Duration::from_millis(ms)).await;
}

/// Count notifications of one kind.
pub fn count(messages: &[ServerWsMessage], pred: impl Fn(&ServerWsMessage) -> bool) -> usize {
    messages.iter().filter(|m| pred(m)).count()
}

pub fn is_match_found(msg: &ServerWsMessage) -> bool {
    matches!(msg, ServerWsMessage::MatchFound(_))
}

pub fn is_board_updated(msg: &ServerWsMessage) -> bool {
    matches!(msg, ServerWsMessage::BoardUpdated { .. })
}

pub fn is_match_completed(msg: &ServerWsMessage) -> bool {
    matches!(msg, ServerWsMessage::MatchCompleted { .. })
}

/// Settlement double that records every hand-off.
#[derive(Clone, Default)]
pub struct RecordingSettlement {
    pub calls: Arc<Mutex<Vec<(MatchId, WalletAddress, Stake)>>>,
}

impl RecordingSettlement {
    pub fn calls(&self) -> Vec<(MatchId, WalletAddress, Stake)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Settlement for RecordingSettlement {
    fn on_match_completed(&self, match_id: MatchId, winner: &WalletAddress, stake: Stake) {
        self.calls.lock().unwrap().push((match_id, winner.clone(), stake));
    }
}
