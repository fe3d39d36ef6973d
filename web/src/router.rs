use crate::controller::{
    health_check_controller, message_controller, resource_controller, tool_controller,
};
use crate::sse::handler::sse_handler;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Event stream subscribers connect here.
pub const SSE_PATH: &str = "/sse";
/// Announced to every subscriber in its endpoint frame.
pub const MESSAGES_PATH: &str = "/messages";
/// Tool invocations whose results are broadcast.
pub const MCP_PATH: &str = "/mcp";

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(sse_routes(app_state.clone()))
        .merge(message_routes())
        .merge(tool_routes(app_state))
        .merge(resource_routes())
        .merge(health_routes())
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route(SSE_PATH, get(sse_handler))
        .with_state(app_state)
}

// Any method other than POST gets 405 Method Not Allowed from the method router.
fn message_routes() -> Router {
    Router::new().route(MESSAGES_PATH, post(message_controller::create))
}

fn tool_routes(app_state: AppState) -> Router {
    Router::new()
        .route(MCP_PATH, post(tool_controller::invoke))
        .with_state(app_state)
}

fn resource_routes() -> Router {
    Router::new()
        .route("/welcome", get(resource_controller::welcome))
        .route("/time", get(resource_controller::time))
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::resource_controller::WELCOME_MESSAGE;
    use crate::controller::tool_controller::TOOL_ACCEPTED_STATUS;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use clap::Parser;
    use serde_json::{json, Value};
    use service::config::Config;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let config = Config::try_parse_from(["mcp_sse_server"]).unwrap();
        define_routes(AppState::new(config, CancellationToken::new()))
    }

    async fn send(method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        test_router().oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn messages_rejects_get_with_405() {
        let response = send(Method::GET, "/messages?sessionId=abc", "").await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn messages_without_session_id_returns_400() {
        let response = send(Method::POST, "/messages", r#"{"hello":"world"}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing sessionId");
    }

    #[tokio::test]
    async fn messages_with_empty_session_id_returns_400() {
        let response = send(Method::POST, "/messages?sessionId=", r#"{}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn messages_with_invalid_json_returns_400() {
        let response = send(Method::POST, "/messages?sessionId=abc", "not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .starts_with("Invalid message payload"));
    }

    #[tokio::test]
    async fn messages_answers_jsonrpc_requests_with_their_id() {
        let response = send(
            Method::POST,
            "/messages?sessionId=abc",
            r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"jsonrpc": "2.0", "id": 7, "result": {}})
        );
    }

    #[tokio::test]
    async fn messages_acknowledges_other_payloads() {
        let response = send(Method::POST, "/messages?sessionId=abc", r#"{"note":"hi"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "received"}));
    }

    #[tokio::test]
    async fn mcp_echo_is_accepted() {
        let response = send(
            Method::POST,
            "/mcp",
            r#"{"tool":"echo","args":{"message":"Hello MCP Server!"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            body_json(response).await,
            json!({"status": TOOL_ACCEPTED_STATUS})
        );
    }

    #[tokio::test]
    async fn mcp_unknown_tool_returns_400() {
        let response = send(Method::POST, "/mcp", r#"{"tool":"nope","args":{}}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "unknown tool");
    }

    #[tokio::test]
    async fn mcp_malformed_body_returns_400() {
        let response = send(Method::POST, "/mcp", "{not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("invalid request"));
    }

    #[tokio::test]
    async fn mcp_bad_arguments_return_400() {
        let response = send(
            Method::POST,
            "/mcp",
            r#"{"tool":"math","args":{"operation":"add","a":"5","b":3}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .starts_with("invalid tool arguments"));
    }

    #[tokio::test]
    async fn mcp_unsupported_operation_returns_500() {
        let response = send(
            Method::POST,
            "/mcp",
            r#"{"tool":"math","args":{"operation":"div","a":6,"b":3}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "error processing tool: unsupported operation: div"
        );
    }

    #[tokio::test]
    async fn sse_with_stopped_broker_returns_503() {
        let config = Config::try_parse_from(["mcp_sse_server"]).unwrap();
        let shutdown = CancellationToken::new();
        let app_state = AppState::new(config, shutdown.clone());
        shutdown.cancel();
        while app_state.sse_manager.is_running() {
            tokio::task::yield_now().await;
        }

        let request = Request::builder()
            .method(Method::GET)
            .uri(SSE_PATH)
            .body(Body::empty())
            .unwrap();
        let response = define_routes(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn welcome_returns_greeting() {
        let response = send(Method::GET, "/welcome", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": WELCOME_MESSAGE}));
    }

    #[tokio::test]
    async fn time_returns_rfc3339_timestamp() {
        let response = send(Method::GET, "/time", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let time = body["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        assert!(time.ends_with('Z'));
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = send(Method::GET, "/health", "").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "healthy");
    }
}
