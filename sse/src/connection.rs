use crate::coordinator::Command;
use crate::handoff::{self, TryOfferError};
use crate::message::BroadcastMessage;
use log::*;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Unique identifier for a session (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One registered subscriber as seen by its delivery loop.
///
/// Dropping a `Session` unregisters it, so a session never outlives the
/// loop that consumes it.
pub struct Session {
    id: SessionId,
    queue: handoff::Receiver<BroadcastMessage>,
    commands: mpsc::Sender<Command>,
    released: bool,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        queue: handoff::Receiver<BroadcastMessage>,
        commands: mpsc::Sender<Command>,
    ) -> Self {
        Self {
            id,
            queue,
            commands,
            released: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Wait for the next broadcast. `None` means the coordinator released the
    /// queue and the session is no longer registered.
    pub async fn recv(&mut self) -> Option<BroadcastMessage> {
        self.queue.recv().await
    }

    /// Stop waiting so broadcasts arriving while busy are dropped.
    pub fn unpark(&mut self) {
        self.queue.unpark();
    }

    /// Unregister and wait until the coordinator has accepted the request.
    pub async fn close(mut self) {
        self.released = true;
        let command = Command::Unregister {
            id: self.id.clone(),
        };
        if self.commands.send(command).await.is_err() {
            debug!(
                "Coordinator already stopped while closing session {}",
                self.id
            );
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let command = Command::Unregister {
            id: self.id.clone(),
        };
        match self.commands.try_send(command) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(command)) => {
                // The coordinator is backed up; finish the release off the drop path.
                let commands = self.commands.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => {
                        runtime.spawn(async move {
                            let _ = commands.send(command).await;
                        });
                    }
                    Err(_) => warn!(
                        "Session {} dropped outside a runtime; its queue is closed but unregistration is lost",
                        self.id
                    ),
                }
            }
        }
    }
}

/// Result of offering one broadcast to every registered session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fanout {
    pub delivered: usize,
    pub dropped: usize,
}

/// The set of active sessions. Owned and mutated only by the coordinator task,
/// so it needs no interior locking.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: HashMap<SessionId, handoff::Sender<BroadcastMessage>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Allocate a fresh identity and queue. The receiving half goes to the caller.
    pub fn register(&mut self) -> (SessionId, handoff::Receiver<BroadcastMessage>) {
        let (sender, receiver) = handoff::channel();
        let mut id = SessionId::new();
        // v4 collisions are not expected, but never overwrite a live session.
        while self.sessions.contains_key(&id) {
            id = SessionId::new();
        }
        self.sessions.insert(id.clone(), sender);
        (id, receiver)
    }

    /// Remove the session and release its queue. Returns false if it was not present.
    pub fn unregister(&mut self, id: &SessionId) -> bool {
        match self.sessions.remove(id) {
            Some(queue) => {
                queue.close();
                true
            }
            None => false,
        }
    }

    /// Offer `message` to each session without blocking. Sessions that are not
    /// waiting miss it.
    pub fn broadcast(&self, message: &BroadcastMessage) -> Fanout {
        let mut fanout = Fanout::default();
        for (id, queue) in &self.sessions {
            match queue.try_offer(message.clone()) {
                Ok(()) => fanout.delivered += 1,
                Err(TryOfferError::NotReady(_)) => {
                    trace!("Session {} busy, dropping broadcast", id);
                    fanout.dropped += 1;
                }
                Err(TryOfferError::Closed(_)) => {
                    trace!("Session {} already gone, dropping broadcast", id);
                    fanout.dropped += 1;
                }
            }
        }
        fanout
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions currently parked waiting for a broadcast.
    pub fn waiting(&self) -> usize {
        self.sessions.values().filter(|queue| queue.is_parked()).count()
    }

    /// Release every queue, e.g. on shutdown.
    pub fn close_all(&mut self) {
        for (_, queue) in self.sessions.drain() {
            queue.close();
        }
    }
}
