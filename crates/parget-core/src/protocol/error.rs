//! Wire-level error type.

use thiserror::Error;

/// Failure to read or write one protocol record.
///
/// `Closed` is not a failure in the usual sense: it means the peer shut the
/// connection down cleanly between records and callers treat it as a normal
/// end of the conversation.
#[derive(Debug, Error)]
pub enum WireError {
    /// Source exhausted before the first byte of a record.
    #[error("peer closed the connection")]
    Closed,
    /// Source exhausted in the middle of a record.
    #[error("connection closed mid-record")]
    Truncated,
    #[error("bad record magic 0x{0:02x}")]
    BadMagic(u8),
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),
    #[error("record of {0} bytes does not fit in memory on this platform")]
    FrameTooLarge(u64),
    #[error("record body: {0}")]
    Body(#[from] bincode::Error),
    #[error("transport: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    /// True when the peer finished normally (no pending bytes).
    pub fn is_closed(&self) -> bool {
        matches!(self, WireError::Closed)
    }
}
