//! Wire protocol shared by client and server.
//!
//! Every exchange is a single [`Message`] envelope. Requests (`GetLen`, `Get`)
//! always carry the remote path; responses (`Len`, `Data`, `Err`) carry the
//! length or a payload. See [`codec`] for the record framing.

mod codec;
mod error;
mod message;

pub use codec::{decode, encode, HEADER_LEN, MAGIC, VERSION};
pub use error::WireError;
pub use message::{Message, MessageKind};
