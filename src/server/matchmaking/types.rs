use std::fmt;

use actix::Recipient;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::server::messages::ServerWsMessage;

pub type WalletAddress = String;
pub type Stake = u64;
pub type ConnectionId = Uuid;
pub type MatchId = Uuid;

/// A live client connection: its id plus the mailbox notifications go to.
#[derive(Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub addr: Recipient<ServerWsMessage>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Connection {
    pub fn new(id: ConnectionId, addr: Recipient<ServerWsMessage>) -> Self {
        Self { id, addr }
    }

    pub fn notify(&self, msg: ServerWsMessage) {
        self.addr.do_send(msg);
    }
}

/// A human waiting to be seated, as handed from the queue to the session manager.
#[derive(Clone, Debug)]
pub struct Participant {
    pub address: WalletAddress,
    pub connection: Connection,
}

/// Read-only view of the waiting slot.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub entry_id: Uuid,
    pub connection_id: ConnectionId,
    pub player_address: WalletAddress,
    pub stake: Stake,
    pub waited_secs: u64,
}
