//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding catalog messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The first response line is not a decimal status code.
    #[error("malformed status line: {line:?}")]
    MalformedStatus { line: String },

    /// The server sent no bytes at all.
    #[error("empty response")]
    EmptyResponse,

    /// A request type name or wire code was not recognised.
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),
}
