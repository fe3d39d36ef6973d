//! Built-in tools and the dispatch path that broadcasts their results.

use crate::error::{DomainErrorKind, Error, InternalErrorKind, InvalidErrorKind};
use events::{DomainEvent, EventPublisher};
use log::*;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Arguments of a tool invocation, as sent in the request's `args` object.
pub type Args = Map<String, Value>;

// Largest integer an f64 represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Returns the `message` argument unchanged.
    Echo,
    /// Adds or subtracts the numeric arguments `a` and `b`.
    Math,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Echo => "echo",
            Tool::Math => "math",
        }
    }

    pub fn execute(&self, args: &Args) -> Result<Value, Error> {
        match self {
            Tool::Echo => echo(args),
            Tool::Math => math(args),
        }
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "echo" => Ok(Tool::Echo),
            "math" => Ok(Tool::Math),
            _ => Err(Error::invalid(InvalidErrorKind::UnknownTool(
                name.to_string(),
            ))),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOperation {
    Add,
    Sub,
}

impl MathOperation {
    fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            MathOperation::Add => a + b,
            MathOperation::Sub => a - b,
        }
    }
}

impl FromStr for MathOperation {
    type Err = Error;

    fn from_str(operation: &str) -> Result<Self, Self::Err> {
        match operation {
            "add" => Ok(MathOperation::Add),
            "sub" => Ok(MathOperation::Sub),
            _ => Err(Error::internal(InternalErrorKind::ToolExecution(format!(
                "unsupported operation: {operation}"
            )))),
        }
    }
}

/// Envelope broadcast to subscribers after a successful invocation.
#[derive(Debug, Serialize)]
pub struct ToolResult {
    pub result: Value,
}

/// Run the named tool and submit its result for broadcast.
///
/// Returns after the broadcast has been handed to the publisher. Nothing is
/// published when the tool name is unknown or execution fails.
pub async fn invoke(publisher: &EventPublisher, name: &str, args: &Args) -> Result<Value, Error> {
    let tool: Tool = name.parse()?;
    let result = tool.execute(args)?;

    let payload = serde_json::to_string(&ToolResult {
        result: result.clone(),
    })
    .map_err(|err| Error {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Serialization),
    })?;

    debug!("Tool {} produced {}", tool, payload);
    publisher
        .publish(DomainEvent::ToolResultReady {
            tool: tool.name().to_string(),
            payload,
        })
        .await;

    Ok(result)
}

fn echo(args: &Args) -> Result<Value, Error> {
    match args.get("message") {
        Some(Value::String(message)) => Ok(Value::String(message.clone())),
        _ => Err(invalid_argument("missing or invalid 'message' field")),
    }
}

fn math(args: &Args) -> Result<Value, Error> {
    let operation = args
        .get("operation")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid_argument("missing or invalid 'operation' field"))?;

    let (a, b) = match (
        args.get("a").and_then(Value::as_f64),
        args.get("b").and_then(Value::as_f64),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(invalid_argument("invalid or missing numbers for 'a' or 'b'")),
    };

    let operation: MathOperation = operation.parse()?;
    number_value(operation.apply(a, b))
}

/// Integral results are emitted without a fractional part (`8`, not `8.0`).
fn number_value(value: f64) -> Result<Value, Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        return Ok(Value::from(value as i64));
    }

    Number::from_f64(value).map(Value::Number).ok_or_else(|| {
        Error::internal(InternalErrorKind::ToolExecution(
            "result is not a finite number".to_string(),
        ))
    })
}

fn invalid_argument(message: &str) -> Error {
    Error::invalid(InvalidErrorKind::InvalidArgument(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use events::EventHandler;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Captured {
        events: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for Captured {
        async fn handle(&self, event: &DomainEvent) {
            self.events.lock().await.push(event.clone());
        }
    }

    fn args(value: Value) -> Args {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn publisher() -> (EventPublisher, Arc<Captured>) {
        let captured = Arc::new(Captured::default());
        let publisher = EventPublisher::new().with_handler(captured.clone());
        (publisher, captured)
    }

    #[test]
    fn echo_returns_message() {
        let result = Tool::Echo
            .execute(&args(json!({"message": "Hello MCP Server!"})))
            .unwrap();
        assert_eq!(result, json!("Hello MCP Server!"));
    }

    #[test]
    fn echo_requires_string_message() {
        let err = Tool::Echo.execute(&args(json!({"message": 5}))).unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Invalid(InvalidErrorKind::InvalidArgument(
                "missing or invalid 'message' field".to_string()
            ))
        );
    }

    #[test]
    fn math_add_and_sub() {
        let add = Tool::Math
            .execute(&args(json!({"operation": "add", "a": 5, "b": 3})))
            .unwrap();
        let sub = Tool::Math
            .execute(&args(json!({"operation": "sub", "a": 1.5, "b": 4})))
            .unwrap();

        assert_eq!(add, json!(8));
        assert_eq!(serde_json::to_string(&add).unwrap(), "8");
        assert_eq!(sub, json!(-2.5));
    }

    #[test]
    fn math_rejects_unsupported_operation_as_execution_error() {
        let err = Tool::Math
            .execute(&args(json!({"operation": "div", "a": 1, "b": 2})))
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::ToolExecution(
                "unsupported operation: div".to_string()
            ))
        );
    }

    #[test]
    fn math_requires_numeric_operands() {
        let err = Tool::Math
            .execute(&args(json!({"operation": "add", "a": "5", "b": 3})))
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Invalid(InvalidErrorKind::InvalidArgument(_))
        ));
    }

    #[test]
    fn math_overflow_is_an_execution_error() {
        let err = Tool::Math
            .execute(&args(json!({"operation": "add", "a": f64::MAX, "b": f64::MAX})))
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::ToolExecution(_))
        ));
    }

    #[test]
    fn unknown_tool_name() {
        let err = "shell".parse::<Tool>().unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Invalid(InvalidErrorKind::UnknownTool("shell".to_string()))
        );
    }

    #[tokio::test]
    async fn invoke_publishes_result_envelope() {
        let (publisher, captured) = publisher();

        let result = invoke(
            &publisher,
            "math",
            &args(json!({"operation": "add", "a": 5, "b": 3})),
        )
        .await
        .unwrap();

        assert_eq!(result, json!(8));
        assert_eq!(
            *captured.events.lock().await,
            vec![DomainEvent::ToolResultReady {
                tool: "math".to_string(),
                payload: r#"{"result":8}"#.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn failed_invocation_publishes_nothing() {
        let (publisher, captured) = publisher();

        let err = invoke(
            &publisher,
            "math",
            &args(json!({"operation": "div", "a": 1, "b": 2})),
        )
        .await
        .unwrap_err();

        assert!(matches!(err.error_kind, DomainErrorKind::Internal(_)));
        assert!(captured.events.lock().await.is_empty());
    }
}
