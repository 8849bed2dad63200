//! Per-connection request loop.

use std::io;
use std::net::SocketAddr;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite};

use super::cache::FileCache;
use crate::protocol::{self, Message, MessageKind};

/// Serves requests on one connection until the peer closes it or a response
/// cannot be written. Connections share nothing; the file cache lives and dies
/// with this call.
pub async fn handle_connection<S>(stream: S, peer: SocketAddr)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut cache = FileCache::default();

    loop {
        let request = match protocol::decode(&mut reader).await {
            Ok(m) => m,
            Err(e) if e.is_closed() => {
                tracing::debug!(%peer, "client closed connection");
                break;
            }
            Err(e) => {
                tracing::warn!(%peer, "failed to read the message: {}", e);
                break;
            }
        };

        let response = dispatch(&mut cache, &request).await;

        if let Err(e) = protocol::encode(&mut writer, &response).await {
            tracing::warn!(%peer, "failed to write message: {}", e);
            break;
        }
    }

    cache.clear();
}

/// Produces the response for one request. Never fails: every problem becomes
/// an `Err` message.
pub(crate) async fn dispatch(cache: &mut FileCache, request: &Message) -> Message {
    let path = request.path.as_str();
    let opened = cache.resolve(path).await;
    if let Err(e) = &opened {
        tracing::warn!(path, "failed to open file: {}", e);
    }

    match request.kind {
        MessageKind::GetLen => {
            tracing::info!(path, "length requested");
            let file = match opened {
                Ok(file) => file,
                Err(e) => return Message::err(format!("open {}: {}", path, e)),
            };
            match file_len(file).await {
                Ok(len) => Message::len(len),
                Err(e) => {
                    tracing::warn!(path, "stat failed: {}", e);
                    Message::err(format!("stat {}: {}", path, e))
                }
            }
        }
        MessageKind::Get => {
            let file = match opened {
                Ok(file) => file,
                Err(e) => return Message::err(format!("open {}: {}", path, e)),
            };
            match read_range(file, request.offset, request.length).await {
                Ok(data) => Message::data(data),
                Err(e) => {
                    tracing::warn!(
                        path,
                        offset = request.offset,
                        length = request.length,
                        "failed to read: {}",
                        e
                    );
                    Message::err(format!("read {}: {}", path, e))
                }
            }
        }
        other => {
            tracing::warn!(kind = %other, "invalid message type from client");
            Message::err("invalid message type")
        }
    }
}

async fn file_len(file: &File) -> io::Result<i64> {
    let len = file.metadata().await?.len();
    i64::try_from(len).map_err(|_| io::Error::other(format!("file size {} out of range", len)))
}

/// Reads exactly `length` bytes at `offset`. Ranges past end of file are the
/// client's mistake and fail like any short read.
async fn read_range(file: &mut File, offset: i64, length: i64) -> io::Result<Vec<u8>> {
    let offset = u64::try_from(offset).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("negative offset {}", offset))
    })?;
    let length = u64::try_from(length).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("negative length {}", length))
    })?;

    let size = file.metadata().await?.len();
    if offset.checked_add(length).map_or(true, |end| end > size) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "range {}+{} extends past end of file ({} bytes)",
                offset, length, size
            ),
        ));
    }

    file.seek(io::SeekFrom::Start(offset)).await?;
    let mut chunk = vec![0u8; length as usize];
    file.read_exact(&mut chunk).await?;
    Ok(chunk)
}
