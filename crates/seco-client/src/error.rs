//! Client error types.

use std::io;

use thiserror::Error;

use seco_protocol::ProtocolError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The command line was missing required input.
    #[error("usage error: {0}")]
    Usage(String),

    /// A response could not be written out.
    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error on an established connection.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The server could not be reached.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// An operation did not finish in time.
    #[error("timeout during {operation}")]
    Timeout { operation: String },

    /// The server closed the connection without sending anything.
    #[error("connection closed before a response was received")]
    ConnectionClosed,

    /// The response exceeded the size limit.
    #[error("response too large: more than {max} bytes")]
    ResponseTooLarge { max: usize },

    /// The response could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] ProtocolError),

    /// Every attempt of a call failed at the transport level.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Creates a timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error is a transport fault worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Connect { .. } | Self::Timeout { .. } | Self::ConnectionClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_classification() {
        assert!(ClientError::ConnectionClosed.is_transport());
        assert!(ClientError::timeout("connecting").is_transport());
        assert!(
            ClientError::Io(io::Error::from(io::ErrorKind::ConnectionReset)).is_transport()
        );
        assert!(
            ClientError::Connect {
                addr: "127.0.0.1:1".into(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
            .is_transport()
        );

        assert!(!ClientError::config("bad").is_transport());
        assert!(!ClientError::Usage("no hashes given".into()).is_transport());
        assert!(!ClientError::ResponseTooLarge { max: 1 }.is_transport());
        assert!(!ClientError::MalformedResponse(ProtocolError::EmptyResponse).is_transport());
        assert!(
            !ClientError::RetriesExhausted {
                attempts: 3,
                last: Box::new(ClientError::ConnectionClosed),
            }
            .is_transport()
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            ClientError::Usage("no hashes given".into()).to_string(),
            "usage error: no hashes given"
        );
        assert_eq!(
            ClientError::timeout("waiting for response").to_string(),
            "timeout during waiting for response"
        );
        let err = ClientError::RetriesExhausted {
            attempts: 3,
            last: Box::new(ClientError::ConnectionClosed),
        };
        assert_eq!(
            err.to_string(),
            "giving up after 3 attempts: connection closed before a response was received"
        );
    }
}
