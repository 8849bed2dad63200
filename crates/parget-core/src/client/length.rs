//! One-shot file size query.

use tokio::net::TcpStream;

use super::error::ClientError;
use crate::protocol::{self, Message, MessageKind};

/// Asks the server at `server_addr` for the size of `remote_path`.
///
/// Uses its own short-lived connection, closed on return whatever the outcome.
pub async fn get_length(server_addr: &str, remote_path: &str) -> Result<i64, ClientError> {
    let mut stream = TcpStream::connect(server_addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: server_addr.to_string(),
            source,
        })?;

    protocol::encode(&mut stream, &Message::get_len(remote_path)).await?;
    let response = protocol::decode(&mut stream).await?;

    match response.kind {
        MessageKind::Len => {
            tracing::debug!(path = remote_path, length = response.length, "length query answered");
            Ok(response.length)
        }
        MessageKind::Err => Err(ClientError::Server(response.error_text())),
        other => Err(ClientError::UnexpectedResponse(other)),
    }
}
