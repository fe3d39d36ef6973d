//! Server-Sent Events (SSE) session broker.
//!
//! This crate tracks connected subscribers, gives each a unique session id,
//! fans broadcast payloads out to all of them without ever blocking on a slow
//! consumer, keeps idle streams alive with heartbeats, and tears sessions down
//! when the connection ends.
//!
//! # Architecture
//!
//! - **Single-owner coordinator**: one task owns the session registry and
//!   applies register, unregister and broadcast requests in arrival order.
//!   Everything else talks to it through a cloneable [`Manager`] handle, so the
//!   registry needs no lock.
//! - **Zero-capacity handoff**: each session's queue only accepts a message
//!   while its delivery loop is parked waiting for one. A subscriber that is
//!   busy writing a previous frame simply misses the broadcast.
//! - **Ephemeral messages**: delivery is best effort. Nothing is retried or
//!   buffered, and producers are never told who missed a message.
//! - **Scoped cleanup**: a [`Session`] unregisters itself when dropped, so every
//!   exit path of a delivery loop releases its registry entry.
//!
//! # Message Flow
//!
//! 1. A subscriber opens the `/sse` stream
//! 2. The [`DeliveryLoop`] registers a [`Session`] and writes the endpoint frame
//! 3. A producer publishes a [`events::DomainEvent`]; the
//!    [`SseDomainEventHandler`] forwards its payload to [`Manager::broadcast`]
//! 4. The coordinator offers the payload to every session's queue
//! 5. Each delivery loop writes the payload as a data frame to its subscriber
//! 6. On disconnect the loop's cancellation token fires and the session is
//!    unregistered
//!
//! # Modules
//!
//! - `connection`: `SessionId`, `Session` and the coordinator-owned `ConnectionRegistry`
//! - `coordinator`: the coordinator task and `BrokerStats`
//! - `delivery`: the per-subscriber `DeliveryLoop` and the `FrameSink` seam
//! - `handoff`: the zero-capacity queue between coordinator and delivery loop
//! - `manager`: the public handle to the coordinator
//! - `message`: `BroadcastMessage` and wire `Frame`s

pub mod connection;
mod coordinator;
pub mod delivery;
pub mod domain_event_handler;
pub mod error;
pub mod handoff;
pub mod manager;
pub mod message;

pub use connection::{Session, SessionId};
pub use coordinator::BrokerStats;
pub use delivery::{DeliveryLoop, EventSink, ExitReason, FrameSink};
pub use domain_event_handler::SseDomainEventHandler;
pub use manager::{BrokerConfig, Manager};
pub use message::{BroadcastMessage, Frame};
