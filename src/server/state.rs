// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds references to the main actor addresses (matchmaking, match registry, leaderboard).
//! Used to share state between HTTP/WebSocket handlers and the actor system.

use actix::Addr;
use crate::server::matchmaking::server::MatchmakingServer;
use crate::server::game_session::server::GameSessionManager;
use crate::server::leaderboard::Leaderboard;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the matchmaking server actor (owns the waiting slot).
    pub matchmaking_addr: Addr<MatchmakingServer>,
    /// Address of the game session manager actor (registry of matches).
    pub game_session_manager: Addr<GameSessionManager>,
    /// Address of the leaderboard read-model.
    pub leaderboard: Addr<Leaderboard>,
}

impl AppState {
    /// Create a new AppState with the given actor addresses.
    pub fn new(
        matchmaking_addr: Addr<MatchmakingServer>,
        game_session_manager: Addr<GameSessionManager>,
        leaderboard: Addr<Leaderboard>,
    ) -> Self {
        AppState {
            matchmaking_addr,
            game_session_manager,
            leaderboard,
        }
    }
}
