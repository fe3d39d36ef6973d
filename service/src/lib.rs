use config::Config;
use events::EventPublisher;
use log::info;
use sse::{Manager, SseDomainEventHandler};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub mod config;
pub mod logging;

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sse_manager: Manager,
    pub event_publisher: EventPublisher,
    /// Cancelled on server shutdown; every event stream runs on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Starts the broadcast coordinator and wires the SSE handler into the
    /// event publisher. Must be called from within a tokio runtime.
    pub fn new(app_config: Config, shutdown: CancellationToken) -> Self {
        let broker_config = app_config.broker_config();
        info!(
            "SSE broker config: queue_depth={}, max_sessions={}, heartbeat={}s",
            broker_config.queue_depth,
            broker_config
                .max_sessions
                .map_or_else(|| "unlimited".to_string(), |max| max.to_string()),
            app_config.heartbeat_interval_secs,
        );

        let sse_manager = Manager::start(broker_config, shutdown.clone());
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(sse_manager.clone())));

        Self {
            config: app_config,
            sse_manager,
            event_publisher,
            shutdown,
        }
    }
}
