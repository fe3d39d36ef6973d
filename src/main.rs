use log::{error, info, warn};
use service::{config::Config, logging::Logger, AppState};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    let shutdown = CancellationToken::new();
    let app_state = AppState::new(config, shutdown.clone());

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, closing event streams...");
                shutdown.cancel();
            }
            Err(e) => warn!("Unable to listen for shutdown signal: {e}"),
        }
    });

    info!("Example prompts:");
    info!(r#"1. {{"tool": "echo", "args": {{"message": "Hello MCP Server!"}}}}"#);
    info!(r#"2. {{"tool": "math", "args": {{"operation": "add", "a": 5, "b": 3}}}}"#);
    info!("Connect to /sse to receive SSE events.");

    if let Err(e) = web::init_server(app_state).await {
        error!("Failed to start server: {e}");
        std::process::exit(1);
    }

    info!("Server stopped");
}
