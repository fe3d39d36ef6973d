//! Event system infrastructure for the MCP SSE server.
//!
//! This crate provides the event system that decouples producers (tool
//! execution in the web layer) from the infrastructure that fans their output
//! out to subscribers (the SSE broker).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing every event a producer can submit
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, avoiding circular
//! dependencies. Payloads are carried as already-serialized text.

use async_trait::async_trait;
use log::*;
use std::sync::Arc;

/// Events submitted by producers for fan-out to every connected subscriber.
///
/// There is no per-subscriber targeting: every event is offered to all
/// sessions that are registered at the moment the broker processes it.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// Emitted after a tool invocation completes successfully.
    ToolResultReady {
        /// Name of the tool that produced the result (e.g. "math").
        tool: String,
        /// Serialized result envelope, e.g. `{"result":8}`. Sent verbatim as
        /// the data line of an SSE frame.
        payload: String,
    },
}

impl DomainEvent {
    /// The serialized payload carried by this event.
    pub fn payload(&self) -> &str {
        match self {
            DomainEvent::ToolResultReady { payload, .. } => payload,
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like broadcasting to subscribers,
/// logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    ///
    /// Returns once every handler has accepted the event. For the SSE handler
    /// that means the broker has queued the broadcast, not that any subscriber
    /// has received it.
    pub async fn publish(&self, event: DomainEvent) {
        if self.handlers.is_empty() {
            debug!("No handlers registered, dropping event: {event:?}");
            return;
        }

        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
