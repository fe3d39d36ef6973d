//! Error types for the SSE broker.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The broadcast coordinator is no longer processing requests, either
    /// because the server is shutting down or every handle to it was dropped.
    CoordinatorStopped,

    /// Registration refused because the configured subscriber cap is reached.
    SessionLimitReached { limit: usize },

    /// A frame could not be written to the subscriber's transport. Treated
    /// the same as a disconnect.
    SinkClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CoordinatorStopped => write!(f, "broadcast coordinator is not running"),
            Error::SessionLimitReached { limit } => {
                write!(f, "session limit of {} subscribers reached", limit)
            }
            Error::SinkClosed => write!(f, "subscriber transport closed"),
        }
    }
}

impl std::error::Error for Error {}
