//! Length-framed record encoding.
//!
//! ```text
//! +-------+-------+----------------------+--------------------------+
//! | magic | ver   | body_len (u64, BE)   | body (bincode Message)   |
//! +-------+-------+----------------------+--------------------------+
//!   1 byte  1 byte        8 bytes              body_len bytes
//! ```
//!
//! One record per message; no limit on body length beyond available memory.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::WireError;
use super::message::Message;

/// First byte of every record ('P').
pub const MAGIC: u8 = 0x50;

/// Record layout version.
pub const VERSION: u8 = 0x01;

/// Fixed header size: magic(1) + version(1) + body_len(8).
pub const HEADER_LEN: usize = 10;

/// Writes `message` to `sink` as one record and flushes.
pub async fn encode<W>(sink: &mut W, message: &Message) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let body = bincode::serialize(message)?;

    let mut header = [0u8; HEADER_LEN];
    header[0] = MAGIC;
    header[1] = VERSION;
    header[2..].copy_from_slice(&(body.len() as u64).to_be_bytes());

    sink.write_all(&header).await?;
    sink.write_all(&body).await?;
    sink.flush().await?;
    Ok(())
}

/// Reads exactly one record from `source`.
///
/// Blocks until a full record is available. Returns [`WireError::Closed`] when
/// the source is exhausted before the first header byte.
pub async fn decode<R>(source: &mut R) -> Result<Message, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    if source.read(&mut header[..1]).await? == 0 {
        return Err(WireError::Closed);
    }
    read_exact_or_truncated(source, &mut header[1..]).await?;

    if header[0] != MAGIC {
        return Err(WireError::BadMagic(header[0]));
    }
    if header[1] != VERSION {
        return Err(WireError::UnsupportedVersion(header[1]));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[2..]);
    let body_len = u64::from_be_bytes(len_bytes);
    usize::try_from(body_len).map_err(|_| WireError::FrameTooLarge(body_len))?;

    // The header is untrusted: grow the buffer only as body bytes arrive.
    let mut body = Vec::new();
    (&mut *source).take(body_len).read_to_end(&mut body).await?;
    if body.len() as u64 != body_len {
        return Err(WireError::Truncated);
    }
    Ok(bincode::deserialize(&body)?)
}

async fn read_exact_or_truncated<R>(source: &mut R, buf: &mut [u8]) -> Result<(), WireError>
where
    R: AsyncRead + Unpin,
{
    match source.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Err(WireError::Truncated),
        Err(e) => Err(WireError::Io(e)),
    }
}
