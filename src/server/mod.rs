// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Matchmaking (single waiting slot, scripted-opponent fallback)
//! - Match sessions (one actor per match, registry, completion feed)
//! - The per-connection event gateway

pub mod state;
pub mod router;
pub mod messages;
pub mod matchmaking;
pub mod game_session;
pub mod gateway;
pub mod settlement;
pub mod leaderboard;
pub mod ws_error;
