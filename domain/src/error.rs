//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree with `domain::error::Error`
/// as the root, holding an `error_kind` that says what went wrong and an
/// optional `source` with the original error from a lower layer (the SSE
/// broker, serde). `web` maps the `error_kind` to an HTTP status and message.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    /// The caller sent something we cannot act on.
    Invalid(InvalidErrorKind),
    /// The request was fine but handling it failed on our side.
    Internal(InternalErrorKind),
}

/// Client input errors. Always local to the request that caused them.
#[derive(Debug, PartialEq)]
pub enum InvalidErrorKind {
    /// Request body is not the JSON we expect. Carries the full message.
    MalformedPayload(String),
    /// A required query parameter is absent or empty.
    MissingParameter(String),
    /// No tool with this name exists.
    UnknownTool(String),
    /// A tool argument is missing or has the wrong type.
    InvalidArgument(String),
}

#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// The tool ran and failed (e.g. unsupported operation).
    ToolExecution(String),
    /// A result could not be serialized for broadcast.
    Serialization,
    /// The SSE broker cannot take the request right now.
    Unavailable(String),
    Other(String),
}

impl Error {
    pub fn new(error_kind: DomainErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub fn invalid(kind: InvalidErrorKind) -> Self {
        Self::new(DomainErrorKind::Invalid(kind))
    }

    pub fn internal(kind: InternalErrorKind) -> Self {
        Self::new(DomainErrorKind::Internal(kind))
    }

    /// A request body failed to parse. `context` prefixes the parser's message.
    pub fn malformed_payload(context: &str, err: serde_json::Error) -> Self {
        Error {
            error_kind: DomainErrorKind::Invalid(InvalidErrorKind::MalformedPayload(format!(
                "{context}: {err}"
            ))),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Invalid(kind) => match kind {
                InvalidErrorKind::MalformedPayload(msg) => write!(f, "{msg}"),
                InvalidErrorKind::MissingParameter(name) => write!(f, "Missing {name}"),
                InvalidErrorKind::UnknownTool(_) => write!(f, "unknown tool"),
                InvalidErrorKind::InvalidArgument(msg) => {
                    write!(f, "invalid tool arguments: {msg}")
                }
            },
            DomainErrorKind::Internal(kind) => match kind {
                InternalErrorKind::ToolExecution(msg) => {
                    write!(f, "error processing tool: {msg}")
                }
                InternalErrorKind::Serialization => match &self.source {
                    Some(source) => write!(f, "error marshalling result: {source}"),
                    None => write!(f, "error marshalling result"),
                },
                InternalErrorKind::Unavailable(msg) => write!(f, "service unavailable: {msg}"),
                InternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `sse` broker to the `domain` layer.
impl From<sse::error::Error> for Error {
    fn from(err: sse::error::Error) -> Self {
        let error_kind = match &err {
            sse::error::Error::CoordinatorStopped
            | sse::error::Error::SessionLimitReached { .. } => {
                DomainErrorKind::Internal(InternalErrorKind::Unavailable(err.to_string()))
            }
            sse::error::Error::SinkClosed => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
