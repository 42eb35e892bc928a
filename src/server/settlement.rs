//! Settlement hand-off.
//!
//! The core never moves funds. When a human wins, the session manager calls
//! `Settlement::on_match_completed` once and forgets about it; failures are
//! the collaborator's business.

use log::info;

use crate::server::matchmaking::types::{MatchId, Stake, WalletAddress};

pub trait Settlement: Send + Sync {
    fn on_match_completed(&self, match_id: MatchId, winner: &WalletAddress, stake: Stake);
}

/// Default collaborator: logs the payout it would authorize.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSettlement;

impl Settlement for LogSettlement {
    fn on_match_completed(&self, match_id: MatchId, winner: &WalletAddress, stake: Stake) {
        // Both stakes go to the winner.
        let payout = stake.saturating_mul(2);
        info!(
            "[Settlement] Authorizing payout of {} to {} for match {}",
            payout, winner, match_id
        );
    }
}
