use crate::message::BroadcastMessage;
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;

/// Handles domain events by broadcasting their payload to every SSE session.
///
/// `handle` returns once the coordinator has accepted the broadcast. Whether
/// individual subscribers were ready to receive it is not reported back.
pub struct SseDomainEventHandler {
    sse_manager: Manager,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Manager) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::ToolResultReady { tool, payload } => {
                debug!("Broadcasting result of tool {}", tool);

                let message = BroadcastMessage::new(payload.as_str());
                if let Err(e) = self.sse_manager.broadcast(message).await {
                    error!("Failed to broadcast result of tool {}: {}", tool, e);
                }
            }
        }
    }
}
