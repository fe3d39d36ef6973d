use crate::router::MESSAGES_PATH;
use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::State;
use axum::http::header;
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use log::*;
use sse::{DeliveryLoop, EventSink};
use tokio::sync::mpsc;

/// SSE handler that establishes a long-lived stream for broadcast results.
///
/// The session is registered before the response starts, so a refused
/// registration surfaces as a 503 instead of an empty stream. Frames are
/// produced by a delivery loop task; the response body only relays them.
/// When the client goes away axum drops the body, which cancels the loop.
pub(crate) async fn sse_handler(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let delivery = DeliveryLoop::new(app_state.sse_manager.clone(), MESSAGES_PATH)
        .with_heartbeat_interval(app_state.config.heartbeat_interval());
    let session = delivery.connect().await?;
    let session_id = session.id().clone();
    debug!("Establishing SSE stream for session {}", session_id);

    // One slot: while the body has not picked up the previous frame, the loop
    // counts as busy and broadcasts skip it.
    let (tx, mut rx) = mpsc::channel(1);
    let cancel = app_state.shutdown.child_token();
    let disconnect = cancel.clone().drop_guard();
    tokio::spawn(delivery.run(session, EventSink::new(tx), cancel));

    let stream = stream! {
        let _disconnect = disconnect;
        while let Some(event) = rx.recv().await {
            yield event;
        }
        debug!("SSE stream for session {} finished", session_id);
    };

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(stream),
    ))
}
