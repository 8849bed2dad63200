//! Parallel download client.
//!
//! Flow: [`get_length`] learns the remote size, then [`download`] plans
//! fixed-size chunks, feeds them to a pool of workers (one persistent
//! connection each) and hands fetched chunks to a single merge writer that
//! owns the output file.
//!
//! Known limitation: a chunk that fails (server `Err`, protocol violation,
//! transport error, write error) is dropped, never retried, so the output keeps
//! a zeroed hole of that range. [`DownloadReport`] tells the caller.

mod error;
mod length;
mod merge;
mod worker;

pub use error::ClientError;
pub use length::get_length;
pub use merge::MergeSummary;
pub use worker::WorkerStats;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::config::ClientSettings;
use crate::progress::ProgressStats;
use crate::segmenter::{plan_chunks, Chunk};
use crate::storage::StorageWriterBuilder;
use merge::MergeWriter;
use worker::Worker;

/// Immutable parameters of one download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    /// `host:port` of the server.
    pub server_addr: String,
    /// Path of the file on the server, passed through as given.
    pub remote_path: String,
    /// Destination file; created or truncated.
    pub local_path: PathBuf,
    /// Bytes per chunk (> 0).
    pub chunk_size: u64,
    /// Number of workers, i.e. concurrent connections (> 0).
    pub connections: usize,
}

impl DownloadOptions {
    pub fn new(
        server_addr: impl Into<String>,
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        settings: &ClientSettings,
    ) -> Self {
        Self {
            server_addr: server_addr.into(),
            remote_path: remote_path.into(),
            local_path: local_path.into(),
            chunk_size: settings.chunk_size,
            connections: settings.connections,
        }
    }
}

/// Outcome of a download run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub total_size: u64,
    /// Chunks handed to the work queue.
    pub chunks_scheduled: usize,
    /// Chunks the merge writer placed in the file.
    pub chunks_written: usize,
    pub bytes_written: u64,
    /// Chunks workers gave up on (server `Err`, bad response, transport).
    pub chunks_dropped: usize,
    /// Fetched chunks the merge writer could not write.
    pub chunks_failed: usize,
    /// Workers that exited early (no connection) or panicked.
    pub workers_failed: usize,
}

impl DownloadReport {
    /// True when every byte of the remote file reached the output file.
    pub fn is_complete(&self) -> bool {
        self.bytes_written == self.total_size
    }

    /// Bytes left as holes in the output file.
    pub fn missing_bytes(&self) -> u64 {
        self.total_size.saturating_sub(self.bytes_written)
    }
}

/// Downloads `total_size` bytes of `opts.remote_path` into `opts.local_path`.
///
/// Fails only on setup problems (invalid options, zero size, output file cannot
/// be created). Per-chunk failures are logged and reflected in the report.
/// When `progress_tx` is set, a [`ProgressStats`] snapshot is sent after every
/// chunk written.
pub async fn download(
    opts: &DownloadOptions,
    total_size: u64,
    progress_tx: Option<mpsc::Sender<ProgressStats>>,
) -> Result<DownloadReport> {
    if opts.chunk_size == 0 || opts.connections == 0 {
        anyhow::bail!(
            "chunk size and connection count must be positive (got {} and {})",
            opts.chunk_size,
            opts.connections
        );
    }
    if total_size == 0 {
        anyhow::bail!("server reported file size 0");
    }

    let plan = plan_chunks(total_size, opts.chunk_size);
    let chunk_count = plan.len();

    let mut builder = StorageWriterBuilder::create(&opts.local_path)?;
    builder.preallocate(total_size)?;
    let storage = builder.build();

    let (work_tx, work_rx) = mpsc::channel::<Chunk>(opts.connections);
    let (done_tx, done_rx) = mpsc::channel::<Chunk>(opts.connections);

    let merger = tokio::task::spawn_blocking(move || {
        MergeWriter::new(storage, total_size, chunk_count).run(done_rx, progress_tx)
    });

    let queue = Arc::new(Mutex::new(work_rx));
    let server_addr: Arc<str> = Arc::from(opts.server_addr.as_str());
    let remote_path: Arc<str> = Arc::from(opts.remote_path.as_str());
    let mut workers = JoinSet::new();
    for id in 0..opts.connections {
        let worker = Worker {
            id,
            server_addr: Arc::clone(&server_addr),
            remote_path: Arc::clone(&remote_path),
        };
        workers.spawn(worker.run(Arc::clone(&queue), done_tx.clone()));
    }
    // Workers hold the only remaining handles: once they all exit the queue
    // closes for the scheduler and the completion channel closes for the merger.
    drop(queue);
    drop(done_tx);

    let mut chunks_scheduled = 0usize;
    for chunk in plan {
        if work_tx.send(chunk).await.is_err() {
            tracing::warn!(
                unscheduled = chunk_count - chunks_scheduled,
                "all workers exited, stopping chunk scheduling"
            );
            break;
        }
        chunks_scheduled += 1;
    }
    drop(work_tx);

    let mut workers_failed = 0usize;
    let mut chunks_dropped = 0usize;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(stats)) => {
                tracing::debug!(?stats, "worker exited");
                chunks_dropped += stats.chunks_dropped;
            }
            Ok(Err(e)) => {
                tracing::warn!("worker exited early: {}", e);
                workers_failed += 1;
            }
            Err(e) => {
                tracing::warn!("worker task failed: {}", e);
                workers_failed += 1;
            }
        }
    }

    let summary = merger.await.context("merge writer task join")??;

    let report = DownloadReport {
        total_size,
        chunks_scheduled,
        chunks_written: summary.chunks_written,
        bytes_written: summary.bytes_written,
        chunks_dropped,
        chunks_failed: summary.chunks_failed,
        workers_failed,
    };
    tracing::info!(
        path = %opts.local_path.display(),
        written = report.bytes_written,
        total = report.total_size,
        dropped = report.chunks_dropped,
        failed = report.chunks_failed,
        "download finished"
    );
    Ok(report)
}
