//! Error types for Tickflow.
//!
//! All errors are represented by the `TickflowError` enum. Business failures
//! are not errors: a handler reports them by returning a node in the `fail`
//! state. Everything here aborts the current tick.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::NodeId;

/// Unified error type for all Tickflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum TickflowError {
    /// Configuration parsing errors and handler misconfiguration.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML, node hydration).
    #[error("{0}")]
    Convert(String),

    /// Graph definition errors.
    #[error("{0}")]
    Graph(String),

    /// Node definition errors.
    #[error("{0}")]
    Node(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),

    /// No handler is registered for the node type.
    #[error("not found handler for {0}")]
    HandlerNotFound(String),

    /// A handler returned an ordinary error.
    #[error("handler for node {nid} failed: {message}")]
    Handler {
        nid: NodeId,
        message: String,
    },

    /// Non-retryable failure raised by a handler. Never wrapped by dispatch.
    #[error("fatal: {0}")]
    Fatal(String),

    /// Scheduler runtime errors (tick limit, stalled graph).
    #[error("{0}")]
    Runtime(String),

    /// Event queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl TickflowError {
    /// Builds the fatal error kind.
    pub fn fatal(message: impl Into<String>) -> Self {
        TickflowError::Fatal(message.into())
    }

    /// Whether this error must bypass any retry policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TickflowError::Fatal(_))
    }
}

impl From<TickflowError> for String {
    fn from(val: TickflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for TickflowError {
    fn from(error: std::io::Error) -> Self {
        TickflowError::IoError(error.to_string())
    }
}

impl From<TickflowError> for std::io::Error {
    fn from(val: TickflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for TickflowError {
    fn from(_: FromUtf8Error) -> Self {
        TickflowError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for TickflowError {
    fn from(error: serde_json::Error) -> Self {
        TickflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for TickflowError {
    fn from(error: toml::de::Error) -> Self {
        TickflowError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for TickflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        TickflowError::Convert(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_kind() {
        let err = TickflowError::fatal("quota exhausted");
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "fatal: quota exhausted");
        assert!(!TickflowError::Runtime("x".into()).is_fatal());
    }

    #[test]
    fn test_handler_not_found_message() {
        let err = TickflowError::HandlerNotFound("scrape".to_string());
        assert_eq!(err.to_string(), "not found handler for scrape");
    }
}
