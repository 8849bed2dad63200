//! Client-side error type for the length query and chunk fetches.

use thiserror::Error;

use crate::protocol::{MessageKind, WireError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The server answered with an `Err` message.
    #[error("error message from server: {0}")]
    Server(String),
    #[error("invalid response type from server: {0}")]
    UnexpectedResponse(MessageKind),
    /// A `Data` payload whose size differs from the requested length.
    #[error("server sent {received} bytes for a {expected}-byte chunk")]
    LengthMismatch { expected: u64, received: u64 },
    #[error("chunk range {offset}+{length} does not fit the wire format")]
    RangeOverflow { offset: u64, length: u64 },
}
