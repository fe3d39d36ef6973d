use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind, InvalidErrorKind};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match &self.0.error_kind {
            DomainErrorKind::Invalid(invalid_error_kind) => match invalid_error_kind {
                InvalidErrorKind::MalformedPayload(_)
                | InvalidErrorKind::MissingParameter(_)
                | InvalidErrorKind::UnknownTool(_)
                | InvalidErrorKind::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            },
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                InternalErrorKind::ToolExecution(_)
                | InternalErrorKind::Serialization
                | InternalErrorKind::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// Every error becomes a plain-text body carrying the domain error's message.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed with {}: {}", status, self.0);
        } else {
            debug!("Rejected request with {}: {}", status, self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: Error =
            DomainError::invalid(InvalidErrorKind::MissingParameter("sessionId".to_string()))
                .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing sessionId");
    }

    #[test]
    fn tool_failure_maps_to_internal_error() {
        let err: Error = DomainError::internal(InternalErrorKind::ToolExecution(
            "unsupported operation: div".to_string(),
        ))
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn broker_refusal_maps_to_service_unavailable() {
        let err: Error = sse::error::Error::CoordinatorStopped.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
