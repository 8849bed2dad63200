//! Merge writer: the single consumer that places fetched chunks in the output file.

use anyhow::Result;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::progress::ProgressStats;
use crate::segmenter::Chunk;
use crate::storage::StorageWriter;

/// Totals reported by the merge writer once its queue is drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub bytes_written: u64,
    pub chunks_written: usize,
    pub chunks_failed: usize,
}

/// Owns the destination file for the whole transfer.
pub(crate) struct MergeWriter {
    storage: StorageWriter,
    total_size: u64,
    chunk_count: usize,
    summary: MergeSummary,
    started: Instant,
}

impl MergeWriter {
    pub fn new(storage: StorageWriter, total_size: u64, chunk_count: usize) -> Self {
        Self {
            storage,
            total_size,
            chunk_count,
            summary: MergeSummary::default(),
            started: Instant::now(),
        }
    }

    /// Blocking loop: write every chunk received on `completed` at its offset
    /// until the channel is closed, then sync and close the file.
    ///
    /// Run on a blocking thread (`spawn_blocking`). A failed write is logged and
    /// the chunk dropped without counting its bytes.
    pub fn run(
        mut self,
        mut completed: mpsc::Receiver<Chunk>,
        progress_tx: Option<mpsc::Sender<ProgressStats>>,
    ) -> Result<MergeSummary> {
        while let Some(chunk) = completed.blocking_recv() {
            if !self.merge(&chunk) {
                continue;
            }
            if let Some(tx) = &progress_tx {
                let _ = tx.blocking_send(self.progress());
            }
        }
        let summary = self.summary;
        self.storage.finish()?;
        Ok(summary)
    }

    /// Writes one chunk; returns false if it was dropped.
    fn merge(&mut self, chunk: &Chunk) -> bool {
        match self.storage.write_at(chunk.offset, &chunk.data) {
            Ok(()) => {
                self.summary.bytes_written += chunk.data.len() as u64;
                self.summary.chunks_written += 1;
                true
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.storage.path().display(),
                    offset = chunk.offset,
                    "dropping chunk: {:#}",
                    e
                );
                self.summary.chunks_failed += 1;
                false
            }
        }
    }

    fn progress(&self) -> ProgressStats {
        ProgressStats {
            bytes_done: self.summary.bytes_written,
            total_bytes: self.total_size,
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            chunks_done: self.summary.chunks_written,
            chunk_count: self.chunk_count,
        }
    }
}
