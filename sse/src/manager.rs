use crate::connection::{Session, SessionId};
use crate::coordinator::{BrokerStats, Command, Coordinator};
use crate::error::Error;
use crate::message::BroadcastMessage;
use log::*;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Capacity of the coordinator's request channel. Producers wait when it is full.
    pub queue_depth: usize,
    /// Upper bound on concurrently registered sessions. `None` means unlimited.
    pub max_sessions: Option<usize>,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            max_sessions: None,
        }
    }
}

/// Cloneable handle to the broadcast coordinator.
#[derive(Clone)]
pub struct Manager {
    commands: mpsc::Sender<Command>,
}

impl Manager {
    /// Spawn the coordinator task on the current runtime. It stops when
    /// `shutdown` is cancelled or the last handle and session are dropped.
    pub fn start(config: BrokerConfig, shutdown: CancellationToken) -> Self {
        let (commands, receiver) = mpsc::channel(config.queue_depth.max(1));
        let coordinator = Coordinator::new(receiver, config.max_sessions);
        tokio::spawn(coordinator.run(shutdown));
        Self { commands }
    }

    /// Register a new session with a fresh id and an empty queue.
    pub async fn register(&self) -> Result<Session, Error> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Register { reply })
            .await
            .map_err(|_| Error::CoordinatorStopped)?;

        let (id, queue) = response.await.map_err(|_| Error::CoordinatorStopped)??;
        info!("Registered new SSE session {}", id);
        Ok(Session::new(id, queue, self.commands.clone()))
    }

    /// Unregister a session by id. Unknown or already removed ids are ignored.
    pub async fn unregister(&self, id: &SessionId) {
        info!("Unregistering SSE session {}", id);
        let command = Command::Unregister { id: id.clone() };
        if self.commands.send(command).await.is_err() {
            debug!("Coordinator already stopped, nothing to unregister");
        }
    }

    /// Offer `message` to every active session.
    ///
    /// Returns once the coordinator has accepted the request. Delivery to each
    /// subscriber is best effort; nothing reports which sessions missed it.
    pub async fn broadcast(&self, message: BroadcastMessage) -> Result<(), Error> {
        self.commands
            .send(Command::Broadcast { message })
            .await
            .map_err(|_| Error::CoordinatorStopped)
    }

    pub async fn stats(&self) -> Result<BrokerStats, Error> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Stats { reply })
            .await
            .map_err(|_| Error::CoordinatorStopped)?;
        response.await.map_err(|_| Error::CoordinatorStopped)
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }
}
