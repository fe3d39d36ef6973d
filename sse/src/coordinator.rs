//! The broadcast coordinator: a single task that owns the session registry and
//! applies register, unregister and broadcast requests one at a time, in the
//! order they arrive on its command channel.

use crate::connection::{ConnectionRegistry, SessionId};
use crate::error::Error;
use crate::handoff;
use crate::message::BroadcastMessage;
use log::*;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

pub(crate) type Registration = Result<(SessionId, handoff::Receiver<BroadcastMessage>), Error>;

pub(crate) enum Command {
    Register {
        reply: oneshot::Sender<Registration>,
    },
    Unregister {
        id: SessionId,
    },
    Broadcast {
        message: BroadcastMessage,
    },
    Stats {
        reply: oneshot::Sender<BrokerStats>,
    },
}

/// Point-in-time view of the broker, answered in order with other requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    /// Sessions currently registered.
    pub active_sessions: usize,
    /// Registered sessions parked waiting for the next broadcast.
    pub waiting_sessions: usize,
    /// Broadcast requests processed since start.
    pub broadcasts: u64,
    /// Per-session offers that were handed over.
    pub delivered: u64,
    /// Per-session offers dropped because the session was not waiting.
    pub dropped: u64,
}

pub(crate) struct Coordinator {
    registry: ConnectionRegistry,
    commands: mpsc::Receiver<Command>,
    max_sessions: Option<usize>,
    stats: BrokerStats,
}

impl Coordinator {
    pub(crate) fn new(commands: mpsc::Receiver<Command>, max_sessions: Option<usize>) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            commands,
            max_sessions,
            stats: BrokerStats::default(),
        }
    }

    /// Process commands until shutdown is requested or every handle is gone.
    pub(crate) async fn run(mut self, shutdown: CancellationToken) {
        info!("Broadcast coordinator started");

        loop {
            let command = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };
            self.apply(command);
        }

        let remaining = self.registry.len();
        self.registry.close_all();
        self.commands.close();
        info!(
            "Broadcast coordinator stopped, released {} session(s)",
            remaining
        );
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Register { reply } => {
                let registration = self.register();
                if let Err(Ok((id, _))) = reply.send(registration) {
                    // Caller went away before taking the session.
                    self.registry.unregister(&id);
                }
            }
            Command::Unregister { id } => {
                if self.registry.unregister(&id) {
                    debug!(
                        "Unregistered session {} ({} active)",
                        id,
                        self.registry.len()
                    );
                }
            }
            Command::Broadcast { message } => {
                let fanout = self.registry.broadcast(&message);
                self.stats.broadcasts += 1;
                self.stats.delivered += fanout.delivered as u64;
                self.stats.dropped += fanout.dropped as u64;
                debug!(
                    "Broadcast offered to {} session(s), {} dropped",
                    fanout.delivered, fanout.dropped
                );
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn register(&mut self) -> Registration {
        if let Some(limit) = self.max_sessions {
            if self.registry.len() >= limit {
                warn!("Refusing new session, limit of {} reached", limit);
                return Err(Error::SessionLimitReached { limit });
            }
        }

        let (id, queue) = self.registry.register();
        debug!(
            "Registered session {} ({} active)",
            id,
            self.registry.len()
        );
        Ok((id, queue))
    }

    fn snapshot(&self) -> BrokerStats {
        BrokerStats {
            active_sessions: self.registry.len(),
            waiting_sessions: self.registry.waiting(),
            ..self.stats
        }
    }
}
