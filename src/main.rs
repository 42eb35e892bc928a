//! Main entry point for the backend server.
//!
//! Initializes the actor system, configures application state, and launches the HTTP server
//! with the WebSocket endpoint for matchmaking and play.

use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use config::MatchTimings;
use config::server::{port_from_env, BIND_HOST};
use server::game_session::messages::SubscribeCompletions;
use server::game_session::server::GameSessionManager;
use server::leaderboard::Leaderboard;
use server::matchmaking::server::MatchmakingServer;
use server::settlement::LogSettlement;

pub mod config;
mod server;
mod game;
#[cfg(test)]
mod test_support;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let timings = MatchTimings::default();

    // Start the GameSessionManager actor (registry of all matches).
    let game_session_manager = GameSessionManager::new(Arc::new(LogSettlement), timings).start();

    // The leaderboard follows the completion feed.
    let leaderboard = Leaderboard::default().start();
    game_session_manager.do_send(SubscribeCompletions(leaderboard.clone().recipient()));

    // Start the MatchmakingServer actor (owns the waiting slot).
    let matchmaking_addr = MatchmakingServer::new(game_session_manager.clone(), timings).start();

    // Shared application state for HTTP/WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(
        matchmaking_addr,
        game_session_manager,
        leaderboard,
    ));

    let port = port_from_env();
    info!("Server running on http://{}:{}", BIND_HOST, port);

    // Start the HTTP server with the WebSocket endpoint.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((BIND_HOST, port))?
    .run()
    .await
}
