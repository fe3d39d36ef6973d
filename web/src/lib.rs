//! HTTP surface of the MCP SSE server.

use axum::http::{header, HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::{Error, Result};
pub use service::AppState;

mod controller;
pub mod error;
mod params;
pub mod router;
mod sse;

/// Binds the configured address and serves until the shutdown token fires.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("MCP SSE Server started on {}", listener.local_addr()?);
    serve(listener, app_state).await
}

/// Serves the router on an already bound listener. Open event streams are
/// ended through the shutdown token, which lets the graceful drain finish.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    let shutdown = app_state.shutdown.clone();
    let cors = cors_layer(&app_state.config.allowed_origins);
    let router = router::define_routes(app_state).layer(cors);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();
    debug!("CORS allowed origins: {:?}", origins);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::CACHE_CONTROL])
}
