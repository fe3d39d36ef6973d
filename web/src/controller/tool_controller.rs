use crate::params::tool::ToolRequest;
use crate::{AppState, Error};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::error::Error as DomainError;
use domain::tool as ToolApi;
use log::*;
use serde::Serialize;

pub(crate) const TOOL_ACCEPTED_STATUS: &str = "tool executed, result broadcast via SSE";

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub status: &'static str,
}

/// POST /mcp
///
/// Executes a tool and broadcasts `{"result": ...}` to every connected event
/// stream. Responds 202 once the broadcast has been handed to the broker;
/// delivery to individual subscribers is not awaited.
pub async fn invoke(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, Error> {
    let request: ToolRequest = serde_json::from_slice(&body)
        .map_err(|e| DomainError::malformed_payload("invalid request", e))?;
    debug!("POST invoke tool {:?}", request.tool);

    let args = request.args.unwrap_or_default();
    ToolApi::invoke(&app_state.event_publisher, &request.tool, &args).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ToolResponse {
            status: TOOL_ACCEPTED_STATUS,
        }),
    ))
}
