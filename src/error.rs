//! Error types shared by the munin client, the carbon publisher and the poll loop

use std::fmt;
use std::io;

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while talking to either side of the bridge
#[derive(Debug)]
pub enum BridgeError {
    /// TCP connection to an endpoint could not be opened
    Connect { endpoint: String, source: io::Error },

    /// The munin node answered with something we cannot use
    Protocol(String),

    /// The munin node closed the stream before the `.` terminator
    UnexpectedEof { command: String },

    /// A connect, read or write did not finish within the I/O timeout
    Timeout { operation: String },

    /// Writing a record to carbon failed after `written` records went out
    SinkWrite { written: usize, source: io::Error },

    /// Any other I/O failure on an established connection
    Io(io::Error),
}

impl BridgeError {
    /// Whether this error belongs to the "cannot reach the endpoint" kind
    pub fn is_connect(&self) -> bool {
        matches!(self, BridgeError::Connect { .. })
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Connect { endpoint, source } => {
                write!(f, "failed to connect to {}: {}", endpoint, source)
            }
            BridgeError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            BridgeError::UnexpectedEof { command } => {
                write!(f, "unexpected end of stream responding to {}", command)
            }
            BridgeError::Timeout { operation } => write!(f, "timed out during {}", operation),
            BridgeError::SinkWrite { written, source } => {
                write!(f, "write failed after {} records: {}", written, source)
            }
            BridgeError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BridgeError::Connect { source, .. } => Some(source),
            BridgeError::SinkWrite { source, .. } => Some(source),
            BridgeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BridgeError {
    fn from(err: io::Error) -> Self {
        BridgeError::Io(err)
    }
}
