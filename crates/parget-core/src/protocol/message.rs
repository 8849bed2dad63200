//! The message envelope and its kind tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminates request and response semantics of a [`Message`].
///
/// Encoded on the wire as a single byte. Tags this build does not know decode
/// as `Unknown` instead of failing, so a server can answer them with `Err` and
/// keep the connection open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum MessageKind {
    /// Request: size of the file at `path`.
    GetLen,
    /// Request: `length` bytes of `path` starting at `offset`.
    Get,
    /// Response to `GetLen`; size in `length`.
    Len,
    /// Response to `Get`; chunk bytes in `payload`.
    Data,
    /// Failure response; human-readable text in `payload`.
    Err,
    /// Any tag outside the five above.
    Unknown(u8),
}

impl From<u8> for MessageKind {
    fn from(tag: u8) -> Self {
        match tag {
            0 => MessageKind::GetLen,
            1 => MessageKind::Get,
            2 => MessageKind::Len,
            3 => MessageKind::Data,
            4 => MessageKind::Err,
            other => MessageKind::Unknown(other),
        }
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::GetLen => 0,
            MessageKind::Get => 1,
            MessageKind::Len => 2,
            MessageKind::Data => 3,
            MessageKind::Err => 4,
            MessageKind::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::GetLen => write!(f, "GetLen"),
            MessageKind::Get => write!(f, "Get"),
            MessageKind::Len => write!(f, "Len"),
            MessageKind::Data => write!(f, "Data"),
            MessageKind::Err => write!(f, "Err"),
            MessageKind::Unknown(tag) => write!(f, "unknown({})", tag),
        }
    }
}

/// The only structure that crosses the network.
///
/// `offset` and `length` are meaningful for `Get` requests and `Len`
/// responses; `payload` for `Data` and `Err` responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub offset: i64,
    pub length: i64,
    pub path: String,
    pub payload: Vec<u8>,
}

impl Message {
    fn empty(kind: MessageKind) -> Self {
        Self {
            kind,
            offset: 0,
            length: 0,
            path: String::new(),
            payload: Vec::new(),
        }
    }

    pub fn get_len(path: impl Into<String>) -> Self {
        Self::with_kind(MessageKind::GetLen, path)
    }

    pub fn get(path: impl Into<String>, offset: i64, length: i64) -> Self {
        Self {
            offset,
            length,
            ..Self::with_kind(MessageKind::Get, path)
        }
    }

    pub fn len(length: i64) -> Self {
        Self {
            length,
            ..Self::empty(MessageKind::Len)
        }
    }

    pub fn data(payload: Vec<u8>) -> Self {
        Self {
            payload,
            ..Self::empty(MessageKind::Data)
        }
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self {
            payload: text.into().into_bytes(),
            ..Self::empty(MessageKind::Err)
        }
    }

    /// Request-shaped message: `kind` and `path` set, everything else empty.
    pub fn with_kind(kind: MessageKind, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::empty(kind)
        }
    }

    /// Payload interpreted as error text (lossy UTF-8).
    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
