/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Every error frame and response carries a code, a message and an optional
/// context.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

use crate::server::messages::ServerWsMessage;

pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const MATCH_NOT_FOUND: &str = "MATCH_NOT_FOUND";

/// Formats a WebSocket error message as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_INTENT").
/// - `message`: Human-readable error message (in English).
/// - `context`: Optional context (e.g. connection_id, match_id).
pub fn ws_error_message(code: &str, message: &str, context: Option<&str>) -> String {
    let msg = ServerWsMessage::error(code, message, context);
    serde_json::to_string(&msg).unwrap_or_else(|_| {
        concat!(
            r#"{"action":"Error","data":{"code":"INTERNAL_ERROR","#,
            r#""message":"Internal server error","context":null}}"#
        )
        .to_string()
    })
}

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `context`: Optional context string.
/// - `status`: HTTP status code.
pub fn http_error_response(
    code: &str,
    message: &str,
    context: Option<&str>,
    status: StatusCode,
) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": {
            "code": code,
            "message": message,
            "context": context,
        }
    }))
}
