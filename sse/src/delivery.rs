//! Per-subscriber delivery loop.
//!
//! Each connected subscriber gets one loop that writes its frames: the endpoint
//! announcement first, then broadcast data and periodic heartbeats until the
//! connection's cancellation token fires, the transport fails, or the
//! coordinator releases the session.

use crate::connection::Session;
use crate::error::Error;
use crate::message::Frame;
use crate::Manager;
use async_trait::async_trait;
use axum::response::sse::Event;
use log::*;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Destination for one subscriber's frames. `send` returns once the frame has
/// been handed to the transport; an error means the subscriber is gone.
#[async_trait]
pub trait FrameSink: Send {
    async fn send(&mut self, frame: Frame) -> Result<(), Error>;
}

/// Feeds an axum `Sse` response body through a channel.
pub struct EventSink {
    events: mpsc::Sender<Result<Event, Infallible>>,
}

impl EventSink {
    pub fn new(events: mpsc::Sender<Result<Event, Infallible>>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl FrameSink for EventSink {
    async fn send(&mut self, frame: Frame) -> Result<(), Error> {
        self.events
            .send(Ok(frame.to_event()))
            .await
            .map_err(|_| Error::SinkClosed)
    }
}

/// Why a delivery loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The connection's cancellation token fired.
    Cancelled,
    /// Writing a frame failed.
    SinkClosed,
    /// The coordinator released the session (shutdown or external unregister).
    QueueClosed,
}

pub struct DeliveryLoop {
    manager: Manager,
    submission_path: String,
    heartbeat_interval: Duration,
}

impl DeliveryLoop {
    pub fn new(manager: Manager, submission_path: impl Into<String>) -> Self {
        Self {
            manager,
            submission_path: submission_path.into(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_heartbeat_interval(mut self, heartbeat_interval: Duration) -> Self {
        self.heartbeat_interval = heartbeat_interval;
        self
    }

    /// Register a new session with the coordinator.
    pub async fn connect(&self) -> Result<Session, Error> {
        self.manager.register().await
    }

    /// Stream frames for `session` into `sink` until the connection ends.
    /// The session is unregistered before this returns, whatever the exit path.
    pub async fn run<S: FrameSink>(
        self,
        mut session: Session,
        mut sink: S,
        cancel: CancellationToken,
    ) -> ExitReason {
        let endpoint = Frame::endpoint(&self.submission_path, session.id());
        if let Err(reason) = write(&mut sink, endpoint, &cancel).await {
            debug!(
                "Session {} ended before the endpoint frame: {:?}",
                session.id(),
                reason
            );
            session.close().await;
            return reason;
        }

        let mut heartbeat = time::interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let reason = loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => break ExitReason::Cancelled,
                message = session.recv() => match message {
                    Some(message) => Frame::Data { message },
                    None => break ExitReason::QueueClosed,
                },
                _ = heartbeat.tick() => {
                    session.unpark();
                    Frame::Heartbeat
                }
            };

            if let Err(reason) = write(&mut sink, frame, &cancel).await {
                break reason;
            }
        };

        drop(heartbeat);
        debug!("Session {} closed: {:?}", session.id(), reason);
        session.close().await;
        reason
    }
}

/// A write blocked on a subscriber that stopped reading still yields to
/// cancellation.
async fn write<S: FrameSink>(
    sink: &mut S,
    frame: Frame,
    cancel: &CancellationToken,
) -> Result<(), ExitReason> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExitReason::Cancelled),
        written = sink.send(frame) => written.map_err(|e| {
            debug!("Frame write failed: {}", e);
            ExitReason::SinkClosed
        }),
    }
}
