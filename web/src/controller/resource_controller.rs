//! Static resources exposed next to the tool endpoint.

use axum::response::IntoResponse;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::json;

pub(crate) const WELCOME_MESSAGE: &str = "Welcome to the MCP Server!";

/// GET /welcome
pub async fn welcome() -> impl IntoResponse {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// GET /time
///
/// Current server time as an RFC 3339 timestamp.
pub async fn time() -> impl IntoResponse {
    Json(json!({ "time": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true) }))
}
