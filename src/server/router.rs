//! HTTP and WebSocket routing configuration.
//!
//! One WebSocket endpoint carries every client intent; the HTTP endpoints are
//! read-only views over the queue, the match registry and the leaderboard.

use actix_web::{web, HttpResponse, http::StatusCode};
use log::warn;
use uuid::Uuid;

use crate::config::server::LEADERBOARD_SIZE;
use crate::server::game_session::messages::{GetMatchSession, GetMatchView, ListMatches};
use crate::server::gateway::session::ws_connect;
use crate::server::leaderboard::GetLeaderboard;
use crate::server::matchmaking::server::GetQueueStatus;
use crate::server::state::AppState;
use crate::server::ws_error::{http_error_response, INTERNAL_ERROR, MATCH_NOT_FOUND};

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_connect))
        .service(web::resource("/queue").route(web::get().to(queue_status)))
        .service(web::resource("/matches").route(web::get().to(list_matches)))
        .service(web::resource("/matches/{match_id}").route(web::get().to(match_state)))
        .service(web::resource("/leaderboard").route(web::get().to(leaderboard)));
}

fn internal_error(e: impl std::fmt::Display) -> HttpResponse {
    warn!("[Router] Actor mailbox error: {}", e);
    http_error_response(
        INTERNAL_ERROR,
        "Internal server error",
        None,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

fn match_not_found(match_id: Uuid) -> HttpResponse {
    let context = match_id.to_string();
    http_error_response(
        MATCH_NOT_FOUND,
        "Match not found",
        Some(context.as_str()),
        StatusCode::NOT_FOUND,
    )
}

/// The waiting slot, or `null` when nobody is waiting.
async fn queue_status(data: web::Data<AppState>) -> HttpResponse {
    match data.matchmaking_addr.send(GetQueueStatus).await {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(e) => internal_error(e),
    }
}

/// Ids of every match still in the registry, completed ones included.
async fn list_matches(data: web::Data<AppState>) -> HttpResponse {
    match data.game_session_manager.send(ListMatches).await {
        Ok(ids) => HttpResponse::Ok().json(ids),
        Err(e) => internal_error(e),
    }
}

/// Current state of a match; resolves until the match is evicted.
async fn match_state(path: web::Path<Uuid>, data: web::Data<AppState>) -> HttpResponse {
    let match_id = path.into_inner();
    let session = match data.game_session_manager.send(GetMatchSession { match_id }).await {
        Ok(Some(session)) => session,
        Ok(None) => return match_not_found(match_id),
        Err(e) => return internal_error(e),
    };
    match session.send(GetMatchView).await {
        Ok(view) => HttpResponse::Ok().json(view),
        // The session stopped between the lookup and the query.
        Err(_) => match_not_found(match_id),
    }
}

async fn leaderboard(data: web::Data<AppState>) -> HttpResponse {
    match data.leaderboard.send(GetLeaderboard { limit: LEADERBOARD_SIZE }).await {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => internal_error(e),
    }
}
