//! Leaderboard read-model.
//!
//! Subscribes to the match completion feed and keeps per-address totals in
//! memory. Events are applied at most once per match id, so replays from the
//! feed are harmless.

use actix::prelude::*;
use std::collections::{HashMap, HashSet};
use log::debug;
use serde::{Serialize, Deserialize};

use crate::server::game_session::messages::MatchCompletedEvent;
use crate::server::matchmaking::types::{MatchId, Stake, WalletAddress};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub address: WalletAddress,
    pub wins: u32,
    pub played: u32,
    pub total_won: Stake,
}

#[derive(Default)]
pub struct Leaderboard {
    rows: HashMap<WalletAddress, LeaderboardRow>,
    seen: HashSet<MatchId>,
}

impl Leaderboard {
    fn row(&mut self, address: &WalletAddress) -> &mut LeaderboardRow {
        self.rows.entry(address.clone()).or_insert_with(|| LeaderboardRow {
            address: address.clone(),
            ..Default::default()
        })
    }

    pub fn record(&mut self, event: &MatchCompletedEvent) {
        if !self.seen.insert(event.match_id) {
            debug!("[Leaderboard] Duplicate completion for match {} ignored", event.match_id);
            return;
        }
        for address in &event.players {
            self.row(address).played += 1;
        }
        // Only humans have rows; a scripted win credits nobody.
        if let Some(winner) = event.winner_address.as_ref().filter(|w| event.players.contains(*w)) {
            let row = self.row(winner);
            row.wins += 1;
            row.total_won = row.total_won.saturating_add(event.stake.saturating_mul(2));
        }
    }

    /// Rows sorted by total won, then wins, then address.
    pub fn top(&self, limit: usize) -> Vec<LeaderboardRow> {
        let mut rows: Vec<LeaderboardRow> = self.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.total_won
                .cmp(&a.total_won)
                .then(b.wins.cmp(&a.wins))
                .then(a.address.cmp(&b.address))
        });
        rows.truncate(limit);
        rows
    }
}

impl Actor for Leaderboard {
    type Context = Context<Self>;
}

impl Handler<MatchCompletedEvent> for Leaderboard {
    type Result = ();

    fn handle(&mut self, msg: MatchCompletedEvent, _: &mut Context<Self>) -> Self::Result {
        self.record(&msg);
    }
}

#[derive(Message)]
#[rtype(result = "Vec<LeaderboardRow>")]
pub struct GetLeaderboard {
    pub limit: usize,
}

impl Handler<GetLeaderboard> for Leaderboard {
    type Result = MessageResult<GetLeaderboard>;

    fn handle(&mut self, msg: GetLeaderboard, _: &mut Context<Self>) -> Self::Result {
        MessageResult(self.top(msg.limit))
    }
}
