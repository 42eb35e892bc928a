/// WebSocket session handler.
///
/// This actor is one client connection. It parses client intents, routes them
/// through its `Gateway` to the matchmaking server or the match registry, and
/// serializes server notifications back to the client.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use uuid::Uuid;

use super::{Gateway, Route, Association, INVALID_INTENT};
use crate::server::game_session::messages::{DetachConnection, RouteMove};
use crate::server::game_session::server::GameSessionManager;
use crate::server::matchmaking::server::{CancelWaiting, MatchmakingServer, RequestMatch};
use crate::server::matchmaking::types::Connection;
use crate::server::messages::{ClientWsMessage, ServerWsMessage};
use crate::server::ws_error::{ws_error_message, INTERNAL_ERROR};

/// Represents a client's WebSocket session.
pub struct PlayerSession {
    gateway: Gateway,
    matchmaking_addr: Addr<MatchmakingServer>,
    game_session_manager: Addr<GameSessionManager>,
}

impl PlayerSession {
    pub fn new(
        matchmaking_addr: Addr<MatchmakingServer>,
        game_session_manager: Addr<GameSessionManager>,
    ) -> Self {
        Self {
            gateway: Gateway::new(Uuid::new_v4()),
            matchmaking_addr,
            game_session_manager,
        }
    }

    fn dispatch(&mut self, msg: ClientWsMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match self.gateway.route(msg) {
            Route::RequestMatch { player_address, stake } => {
                let connection =
                    Connection::new(self.gateway.connection_id(), ctx.address().recipient());
                let request = RequestMatch {
                    connection,
                    player_address,
                    stake,
                };
                let fut = self
                    .matchmaking_addr
                    .send(request)
                    .into_actor(self)
                    .map(|res, act, _ctx| match res {
                        Ok(outcome) => act.gateway.record_request_outcome(outcome),
                        Err(e) => warn!("[Gateway] Matchmaking unavailable: {}", e),
                    });
                // Hold other intents until the queue has answered.
                ctx.wait(fut);
            }
            Route::ApplyMove { match_id, cell_index } => {
                self.game_session_manager.do_send(RouteMove {
                    match_id,
                    connection_id: self.gateway.connection_id(),
                    cell_index,
                });
            }
            Route::Reject { code, message } => {
                let context = self.gateway.connection_id().to_string();
                ctx.text(ws_error_message(code, message, Some(context.as_str())));
            }
            Route::Ignore => {}
        }
    }
}

impl Actor for PlayerSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Gateway] Connection {} opened", self.gateway.connection_id());
    }

    /// Called when the session stops. Releases the queue slot and the match seat.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let connection_id = self.gateway.connection_id();
        info!("[Gateway] Connection {} closed", connection_id);
        self.matchmaking_addr.do_send(CancelWaiting { connection_id });
        if let Association::InMatch(match_id) = self.gateway.association() {
            self.game_session_manager.do_send(DetachConnection { match_id, connection_id });
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientWsMessage>(&text) {
                Ok(intent) => self.dispatch(intent, ctx),
                Err(e) => {
                    debug!(
                        "[Gateway] Malformed intent from {}: {}",
                        self.gateway.connection_id(),
                        e
                    );
                    ctx.text(ws_error_message(INVALID_INTENT, "Invalid client message", None));
                }
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[Gateway] Protocol error on {}: {}", self.gateway.connection_id(), e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for PlayerSession {
    type Result = ();

    /// Handles notifications sent to this connection.
    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        self.gateway.observe(&msg);
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: notify client and close connection.
                warn!("[Gateway] Failed to serialize ServerWsMessage: {}", e);
                ctx.text(ws_error_message(INTERNAL_ERROR, "Internal server error", None));
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }
}

/// WebSocket endpoint. Every connection starts idle; intents arrive as JSON.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        PlayerSession::new(data.matchmaking_addr.clone(), data.game_session_manager.clone()),
        &req,
        stream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use actix_web::error::PayloadError;
    use actix_web::web::Bytes;
    use futures::StreamExt;
    use futures::channel::mpsc;
    use serde_json::json;

    use crate::config::MatchTimings;
    use crate::game::board::Symbol;
    use crate::game::state::MatchView;
    use crate::server::game_session::messages::{GetMatchSession, GetMatchView, ListMatches};
    use crate::server::gateway::{ALREADY_IN_MATCH, ALREADY_QUEUED};
    use crate::server::matchmaking::server::GetQueueStatus;
    use crate::test_support::*;

    const TEXT: u8 = 0x1;
    const CLOSE: u8 = 0x8;

    /// Encode a client frame. Clients must mask; an all-zero key leaves the
    /// payload unchanged.
    fn client_frame(opcode: u8, payload: &[u8]) -> Bytes {
        let mut frame = vec![0x80 | opcode];
        if payload.len() < 126 {
            frame.push(0x80 | payload.len() as u8);
        } else {
            frame.push(0x80 | 126);
            frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        }
        frame.extend_from_slice(&[0; 4]);
        frame.extend_from_slice(payload);
        Bytes::from(frame)
    }

    /// Pop every complete server text frame off the front of `buf`.
    fn drain_text_frames(buf: &mut Vec<u8>) -> Vec<String> {
        let mut texts = Vec::new();
        while buf.len() >= 2 {
            let (len, header) = match buf[1] & 0x7f {
                126 if buf.len() >= 4 => (u16::from_be_bytes([buf[2], buf[3]]) as usize, 4),
                126 | 127 => break,
                len => (len as usize, 2),
            };
            if buf.len() < header + len {
                break;
            }
            let frame: Vec<u8> = buf.drain(..header + len).collect();
            if frame[0] & 0x0f == TEXT {
                texts.push(String::from_utf8_lossy(&frame[header..]).into_owned());
            }
        }
        texts
    }

    /// A `PlayerSession` fed through an in-memory socket.
    struct Client {
        frames: mpsc::UnboundedSender<Result<Bytes, PayloadError>>,
        texts: Arc<Mutex<Vec<String>>>,
    }

    impl Client {
        fn connect(
            matchmaking: &Addr<MatchmakingServer>,
            manager: &Addr<GameSessionManager>,
        ) -> Self {
            let (frames, incoming) = mpsc::unbounded();
            let session = PlayerSession::new(matchmaking.clone(), manager.clone());
            let outgoing = ws::WebsocketContext::create(session, incoming);
            let texts = Arc::new(Mutex::new(Vec::new()));
            let sink = texts.clone();
            actix::spawn(async move {
                let mut outgoing = Box::pin(outgoing);
                let mut buf = Vec::new();
                while let Some(Ok(chunk)) = outgoing.next().await {
                    buf.extend_from_slice(&chunk);
                    sink.lock().unwrap().extend(drain_text_frames(&mut buf));
                }
            });
            Self { frames, texts }
        }

        fn send_json(&self, value: serde_json::Value) {
            let frame = client_frame(TEXT, value.to_string().as_bytes());
            self.frames.unbounded_send(Ok(frame)).unwrap();
        }

        fn find_match(&self, address: &str, stake: u64) {
            self.send_json(json!({
                "action": "FindMatch",
                "data": { "player_address": address, "stake": stake },
            }));
        }

        fn play(&self, match_id: Uuid, cell_index: usize) {
            self.send_json(json!({
                "action": "Move",
                "data": { "match_id": match_id, "cell_index": cell_index },
            }));
        }

        fn close(&self) {
            self.frames.unbounded_send(Ok(client_frame(CLOSE, &[]))).unwrap();
        }

        fn received(&self) -> Vec<ServerWsMessage> {
            self.texts
                .lock()
                .unwrap()
                .iter()
                .map(|text| serde_json::from_str(text).unwrap())
                .collect()
        }

        fn error_codes(&self) -> Vec<String> {
            self.received()
                .into_iter()
                .filter_map(|m| match m {
                    ServerWsMessage::Error { code, .. } => Some(code),
                    _ => None,
                })
                .collect()
        }

        fn match_found(&self) -> Vec<MatchView> {
            self.received()
                .into_iter()
                .filter_map(|m| match m {
                    ServerWsMessage::MatchFound(view) => Some(view),
                    _ => None,
                })
                .collect()
        }
    }

    fn start() -> (Addr<MatchmakingServer>, Addr<GameSessionManager>) {
        let timings = MatchTimings {
            queue_timeout: Duration::from_secs(30),
            retention: Duration::from_secs(5),
            ..fast_timings()
        };
        let settlement = Arc::new(RecordingSettlement::default());
        let manager = GameSessionManager::new(settlement, timings).start();
        let matchmaking = MatchmakingServer::new(manager.clone(), timings).start();
        (matchmaking, manager)
    }

    async fn view(manager: &Addr<GameSessionManager>, match_id: Uuid) -> MatchView {
        let session = manager.send(GetMatchSession { match_id }).await.unwrap();
        session.expect("match registered").send(GetMatchView).await.unwrap()
    }

    #[actix::test]
    async fn test_closing_a_queued_connection_frees_the_slot() {
        let (matchmaking, manager) = start();
        let client = Client::connect(&matchmaking, &manager);

        client.find_match("0xaaa", 10);
        sleep_ms(50).await;
        let status = matchmaking.send(GetQueueStatus).await.unwrap();
        assert_eq!(status.expect("connection is queued").player_address, "0xaaa");
        assert_eq!(
            client.received(),
            vec![ServerWsMessage::waiting("Searching for an opponent...")]
        );

        client.find_match("0xaaa", 10);
        sleep_ms(50).await;
        assert_eq!(client.error_codes(), vec![ALREADY_QUEUED.to_string()]);

        client.close();
        sleep_ms(50).await;
        assert_eq!(matchmaking.send(GetQueueStatus).await.unwrap(), None);
        assert!(manager.send(ListMatches).await.unwrap().is_empty());
    }

    #[actix::test]
    async fn test_paired_connection_cannot_queue_again() {
        let (matchmaking, manager) = start();
        let a = Client::connect(&matchmaking, &manager);
        let b = Client::connect(&matchmaking, &manager);

        a.find_match("0xaaa", 10);
        sleep_ms(50).await;
        // The second search arrives before b has seen its MatchFound.
        b.find_match("0xbbb", 10);
        b.find_match("0xbbb", 10);
        sleep_ms(50).await;

        assert_eq!(b.error_codes(), vec![ALREADY_IN_MATCH.to_string()]);
        assert_eq!(matchmaking.send(GetQueueStatus).await.unwrap(), None);
        assert_eq!(manager.send(ListMatches).await.unwrap().len(), 1);
        assert_eq!(a.match_found().len(), 1);
        assert_eq!(b.match_found(), a.match_found());
    }

    #[actix::test]
    async fn test_closing_a_seated_connection_releases_its_seat() {
        let (matchmaking, manager) = start();
        let a = Client::connect(&matchmaking, &manager);
        let b = Client::connect(&matchmaking, &manager);

        a.find_match("0xaaa", 10);
        sleep_ms(50).await;
        b.find_match("0xbbb", 10);
        sleep_ms(50).await;
        let match_id = a.match_found()[0].match_id;
        assert!(view(&manager, match_id).await.players.iter().all(|p| p.connected));

        b.close();
        sleep_ms(50).await;
        let state = view(&manager, match_id).await;
        assert!(state.players[0].connected);
        assert!(!state.players[1].connected);
        assert_eq!(state.players[1].address, "0xbbb");

        // The remaining participant keeps playing.
        a.play(match_id, 4);
        sleep_ms(50).await;
        assert_eq!(view(&manager, match_id).await.board[4], Some(Symbol::X));
        assert_eq!(count(&a.received(), is_board_updated), 1);
    }
}
