use crate::connection::SessionId;
use axum::response::sse::Event;
use std::fmt;
use std::sync::Arc;

pub const ENDPOINT_EVENT: &str = "endpoint";
pub const HEARTBEAT_EVENT: &str = "heartbeat";
pub const HEARTBEAT_DATA: &str = "keepalive";

/// One payload offered to every active session. Cloning shares the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    payload: Arc<str>,
}

impl BroadcastMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Arc::from(payload.into()),
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl From<&str> for BroadcastMessage {
    fn from(payload: &str) -> Self {
        Self::new(payload)
    }
}

/// A discrete unit of the event stream written to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// First frame of every stream: where the subscriber should POST messages.
    Endpoint { url: String },
    /// A broadcast payload.
    Data { message: BroadcastMessage },
    /// Keeps intermediaries from timing out an idle stream.
    Heartbeat,
}

impl Frame {
    /// Builds the endpoint announcement, e.g. `/messages?sessionId=<id>`.
    pub fn endpoint(submission_path: &str, session_id: &SessionId) -> Self {
        Frame::Endpoint {
            url: format!("{}?sessionId={}", submission_path, session_id),
        }
    }

    /// The `event:` field of the frame. Data frames use the default event type.
    pub fn event_type(&self) -> Option<&'static str> {
        match self {
            Frame::Endpoint { .. } => Some(ENDPOINT_EVENT),
            Frame::Data { .. } => None,
            Frame::Heartbeat => Some(HEARTBEAT_EVENT),
        }
    }

    pub fn data(&self) -> &str {
        match self {
            Frame::Endpoint { url } => url,
            Frame::Data { message } => message.payload(),
            Frame::Heartbeat => HEARTBEAT_DATA,
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Frame::Heartbeat)
    }

    pub fn to_event(&self) -> Event {
        let event = match self.event_type() {
            Some(event_type) => Event::default().event(event_type),
            None => Event::default(),
        };
        event.data(self.data())
    }
}

/// Renders the frame exactly as it appears on the wire.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(event_type) = self.event_type() {
            writeln!(f, "event: {}", event_type)?;
        }
        // Same line split as axum: an empty payload still gets one `data:` line.
        for line in self.data().split('\n') {
            writeln!(f, "data: {}", line)?;
        }
        writeln!(f)
    }
}
