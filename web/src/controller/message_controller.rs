use crate::params::message::MessageParams;
use crate::Error;

use axum::body::Bytes;
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::Json;
use domain::error::{Error as DomainError, InvalidErrorKind};
use log::*;
use serde_json::{json, Map, Value};

/// POST /messages?sessionId=<id>
///
/// Receives client messages for a session announced on the event stream.
/// JSON-RPC requests get an empty JSON-RPC result echoing their id; anything
/// else is acknowledged as received.
pub async fn create(
    Query(params): Query<MessageParams>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let session_id = params.session_id().ok_or_else(|| {
        DomainError::invalid(InvalidErrorKind::MissingParameter(
            "sessionId".to_string(),
        ))
    })?;

    let payload: Map<String, Value> = serde_json::from_slice(&body)
        .map_err(|e| DomainError::malformed_payload("Invalid message payload", e))?;
    info!("Received message for session {}: {:?}", session_id, payload);

    if payload.contains_key("jsonrpc") {
        let id = payload.get("id").cloned().unwrap_or(Value::Null);
        return Ok(Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {},
        })));
    }

    Ok(Json(json!({ "status": "received" })))
}
