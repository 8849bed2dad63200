//! Download worker: one persistent connection, chunks pulled from a shared queue.

use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use super::error::ClientError;
use crate::protocol::{self, Message, MessageKind};
use crate::segmenter::Chunk;

/// Work queue shared by all workers; whoever holds the lock receives next.
pub(crate) type WorkQueue = Arc<Mutex<mpsc::Receiver<Chunk>>>;

/// What a worker did before its queue ran dry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub chunks_fetched: usize,
    pub chunks_dropped: usize,
}

/// Everything a worker needs besides its queues. Built once by the orchestrator.
#[derive(Debug, Clone)]
pub(crate) struct Worker {
    pub id: usize,
    pub server_addr: Arc<str>,
    pub remote_path: Arc<str>,
}

impl Worker {
    /// Processes chunks until the work queue is closed and drained.
    ///
    /// The connection is opened on the first chunk and kept for the worker's
    /// lifetime. Failing to open it ends the worker with `Err` (the chunk in
    /// hand is lost). Any per-chunk failure drops that chunk: it is neither
    /// retried nor re-queued, leaving a hole in the output file.
    pub async fn run(
        self,
        queue: WorkQueue,
        completed: mpsc::Sender<Chunk>,
    ) -> Result<WorkerStats, ClientError> {
        let mut stats = WorkerStats::default();
        let mut conn: Option<TcpStream> = None;

        while let Some(mut chunk) = next_chunk(&queue).await {
            if conn.is_none() {
                match TcpStream::connect(&*self.server_addr).await {
                    Ok(stream) => conn = Some(stream),
                    Err(source) => {
                        tracing::warn!(worker = self.id, "failed to connect to the server: {}", source);
                        return Err(ClientError::Connect {
                            addr: self.server_addr.to_string(),
                            source,
                        });
                    }
                }
            }
            let Some(stream) = conn.as_mut() else {
                continue;
            };

            match fetch_chunk(stream, &self.remote_path, &chunk).await {
                Ok(data) => {
                    chunk.data = data;
                    if completed.send(chunk).await.is_err() {
                        tracing::warn!(worker = self.id, "merge writer is gone, stopping");
                        break;
                    }
                    stats.chunks_fetched += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        worker = self.id,
                        offset = chunk.offset,
                        length = chunk.length,
                        "dropping chunk: {}",
                        e
                    );
                    stats.chunks_dropped += 1;
                }
            }
        }

        tracing::debug!(
            worker = self.id,
            fetched = stats.chunks_fetched,
            dropped = stats.chunks_dropped,
            "worker finished"
        );
        Ok(stats)
    }
}

async fn next_chunk(queue: &WorkQueue) -> Option<Chunk> {
    queue.lock().await.recv().await
}

/// Sends one `Get` for `chunk` and returns the payload of the `Data` reply.
async fn fetch_chunk(
    stream: &mut TcpStream,
    remote_path: &str,
    chunk: &Chunk,
) -> Result<Vec<u8>, ClientError> {
    let overflow = || ClientError::RangeOverflow {
        offset: chunk.offset,
        length: chunk.length,
    };
    let offset = i64::try_from(chunk.offset).map_err(|_| overflow())?;
    let length = i64::try_from(chunk.length).map_err(|_| overflow())?;

    protocol::encode(stream, &Message::get(remote_path, offset, length)).await?;
    let response = protocol::decode(stream).await?;

    match response.kind {
        MessageKind::Data if response.payload.len() as u64 == chunk.length => Ok(response.payload),
        MessageKind::Data => Err(ClientError::LengthMismatch {
            expected: chunk.length,
            received: response.payload.len() as u64,
        }),
        MessageKind::Err => Err(ClientError::Server(response.error_text())),
        other => Err(ClientError::UnexpectedResponse(other)),
    }
}
